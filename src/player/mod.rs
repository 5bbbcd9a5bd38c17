//! Player module for hls-player
//!
//! This module composes the playback-control layer: quality selection,
//! play/pause/seek tracking, volume, controls auto-hide and fullscreen,
//! behind the `MediaPlayer` facade that the surrounding UI talks to.

pub mod controls;
pub mod fullscreen;
mod media_player;
pub mod playback;
pub mod quality;
pub mod volume;

pub use controls::ControlsVisibility;
pub use fullscreen::{ElementId, FullscreenController, FullscreenHost};
pub use media_player::{EventSubscription, MediaPlayer, MediaPlayerBuilder};
pub use playback::{PlaybackController, PlaybackDuration};
pub use quality::{QualityController, QualitySelection, Rendition};
pub use volume::{VolumeController, VolumeIcon, VolumeState};

use crate::session::BackendKind;
use serde::Serialize;

/// Playback state as last reported by the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Not playing (initial state)
    #[default]
    Paused,

    /// Currently playing
    Playing,

    /// End of media reached
    Ended,
}

/// Icon on the play button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackIcon {
    Play,
    Pause,
    Replay,
}

impl PlaybackState {
    pub fn icon(&self) -> PlaybackIcon {
        match self {
            PlaybackState::Paused => PlaybackIcon::Play,
            PlaybackState::Playing => PlaybackIcon::Pause,
            PlaybackState::Ended => PlaybackIcon::Replay,
        }
    }
}

/// Player event for external event handling
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// A session was opened for a source
    SessionOpened { uri: String, backend: BackendKind },

    /// The session was torn down
    SessionClosed,

    /// The rendition list changed
    RenditionsChanged { renditions: Vec<Rendition> },

    /// The quality selection changed
    SelectionChanged { selection: QualitySelection },

    /// Playback state changed
    PlaybackStateChanged { state: PlaybackState },

    /// Position or length changed
    DurationChanged { duration: PlaybackDuration },

    /// Volume changed
    VolumeChanged { volume: VolumeState },

    /// Something failed without leaving the last valid state
    Error { message: String },
}

/// Player event handler trait
pub trait PlayerEventHandler: Send {
    /// Handle player event
    fn handle_event(&mut self, event: PlayerEvent);
}

/// Serialisable copy of everything the UI can observe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub uri: Option<String>,
    pub backend: Option<BackendKind>,
    pub renditions: Vec<Rendition>,
    pub selection: QualitySelection,
    pub playback_state: PlaybackState,
    pub duration: PlaybackDuration,
    pub volume: VolumeState,
    pub controls_visible: bool,
}
