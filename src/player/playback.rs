//! Play/pause/ended tracking and seeking
//!
//! The sink owns the truth. `PlaybackController` only keeps a projection of
//! the sink's paused/ended flags and clock, refreshed after every request it
//! makes and on every sink notification.

use crate::player::PlaybackState;
use crate::sink::MediaSink;
use crate::utils::clamp;
use log::{debug, warn};
use serde::Serialize;

/// Position and length of the current media, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PlaybackDuration {
    pub current: f64,
    pub total: f64,
}

/// Projection of the sink's playback state and clock
#[derive(Debug, Default)]
pub struct PlaybackController {
    state: PlaybackState,
    duration: PlaybackDuration,
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn duration(&self) -> PlaybackDuration {
        self.duration
    }

    /// Back to `Paused` at `{0, 0}`, for a new source
    pub fn reset(&mut self) {
        self.state = PlaybackState::Paused;
        self.duration = PlaybackDuration::default();
    }

    /// Request play or pause depending on the current state, then read the
    /// outcome back from the sink
    pub fn toggle(&mut self, sink: &mut dyn MediaSink) -> PlaybackState {
        match self.state {
            PlaybackState::Playing => sink.pause(),
            PlaybackState::Paused | PlaybackState::Ended => Self::request_play(sink),
        }
        self.state = Self::project(sink);
        debug!("Toggled playback, sink reports {:?}", self.state);
        self.state
    }

    /// Start playback once the manifest is ready; the host may refuse
    pub fn start(&mut self, sink: &mut dyn MediaSink) -> PlaybackState {
        Self::request_play(sink);
        self.state = Self::project(sink);
        self.state
    }

    /// Move the sink clock to `target`, clamped to `[0, total]`
    ///
    /// Leaves the playback state alone.
    pub fn seek(&mut self, target: f64, sink: &mut dyn MediaSink) {
        if target.is_nan() {
            debug!("Ignoring seek to NaN");
            return;
        }
        let position = clamp(target, 0.0, self.duration.total);
        sink.set_current_time(position);
        self.refresh_current(sink);
        debug!("Seeked to {:.3}s (requested {:.3}s)", self.duration.current, target);
    }

    /// Segment metadata arrived with the full media length
    pub fn on_level_loaded(&mut self, total_duration: f64, sink: &dyn MediaSink) {
        self.duration.total = finite_or_zero(total_duration).max(0.0);
        self.refresh_current(sink);
    }

    /// Sink clock moved; `track_total` also refreshes the length from the
    /// sink when no engine reports it
    pub fn on_time_update(&mut self, sink: &dyn MediaSink, track_total: bool) {
        if track_total {
            self.duration.total = finite_or_zero(sink.duration()).max(0.0);
        }
        self.refresh_current(sink);
        self.reconcile(sink);
    }

    /// Sink says it started or paused on its own
    pub fn on_play_state_changed(&mut self, sink: &dyn MediaSink) {
        self.reconcile(sink);
    }

    /// Sink reached the end of the media
    pub fn on_ended(&mut self, sink: &dyn MediaSink) {
        if !sink.ended() {
            debug!("Ignoring end notification the sink does not confirm");
            return;
        }
        self.refresh_current(sink);
        self.state = PlaybackState::Ended;
    }

    fn request_play(sink: &mut dyn MediaSink) {
        if let Err(e) = sink.play() {
            warn!("Sink refused to play: {}", e);
        }
    }

    fn project(sink: &dyn MediaSink) -> PlaybackState {
        if sink.paused() {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        }
    }

    /// Correct drift without ever entering `Ended` here
    fn reconcile(&mut self, sink: &dyn MediaSink) {
        if self.state == PlaybackState::Ended && sink.ended() {
            return;
        }
        let projected = Self::project(sink);
        if projected != self.state {
            debug!("Playback state drifted: {:?} -> {:?}", self.state, projected);
            self.state = projected;
        }
    }

    fn refresh_current(&mut self, sink: &dyn MediaSink) {
        let current = finite_or_zero(sink.current_time());
        self.duration.current = clamp(current, 0.0, self.duration.total);
    }
}
