//! Volume level and mute state
//!
//! Mute is not stored on its own: a level of zero is muted, anything else
//! is not.

use crate::sink::MediaSink;
use log::debug;
use serde::Serialize;

/// Highest volume level
pub const MAX_LEVEL: u8 = 100;

/// Observable volume, `muted == (level == 0)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VolumeState {
    pub level: u8,
    pub muted: bool,
}

/// Icon tier shown next to the volume slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeIcon {
    Muted,
    Low,
    High,
}

impl VolumeState {
    pub fn icon(&self) -> VolumeIcon {
        match self.level {
            0 => VolumeIcon::Muted,
            1..=50 => VolumeIcon::Low,
            _ => VolumeIcon::High,
        }
    }
}

/// Volume controller, independent of playback state
#[derive(Debug, Default)]
pub struct VolumeController {
    level: u8,
}

impl VolumeController {
    /// Controller starting at level 0; call `set_level` to push a level to
    /// the sink
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> VolumeState {
        VolumeState {
            level: self.level,
            muted: self.level == 0,
        }
    }

    /// Set the level, clamped to `[0, 100]`, and propagate it to the sink
    pub fn set_level(&mut self, level: i32, sink: &mut dyn MediaSink) -> VolumeState {
        self.level = level.clamp(0, MAX_LEVEL as i32) as u8;
        let state = self.state();
        sink.set_muted(state.muted);
        sink.set_volume(f64::from(state.level) / f64::from(MAX_LEVEL));
        debug!("Volume set to {} (muted: {})", state.level, state.muted);
        state
    }

    /// Muted goes to full volume, anything else goes to zero
    ///
    /// The level before muting is not remembered.
    pub fn toggle_mute(&mut self, sink: &mut dyn MediaSink) -> VolumeState {
        let target = if self.level == 0 { MAX_LEVEL } else { 0 };
        self.set_level(i32::from(target), sink)
    }
}
