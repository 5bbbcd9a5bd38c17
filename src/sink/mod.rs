//! Media sink module for hls-player
//!
//! This module defines the boundary to the platform's media-playback
//! element. The sink decodes and renders; this crate only drives it and
//! reads its state back.

use crate::utils::error::Result;

/// Platform media-playback element
///
/// The sink's own flags are the ground truth for playback state. Every
/// controller that mutates the sink reads the outcome back through these
/// getters instead of assuming it.
pub trait MediaSink: Send {
    /// Request playback
    ///
    /// Hosts may refuse (autoplay policy). A refusal is reported as an error
    /// and leaves `paused()` true.
    fn play(&mut self) -> Result<()>;

    /// Request pause
    fn pause(&mut self);

    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Move the playback position, in seconds
    fn set_current_time(&mut self, seconds: f64);

    /// Media duration in seconds (NaN or infinite when unknown)
    fn duration(&self) -> f64;

    /// Output volume (0.0 to 1.0)
    fn volume(&self) -> f64;

    /// Set output volume (0.0 to 1.0)
    fn set_volume(&mut self, volume: f64);

    /// Check if muted
    fn muted(&self) -> bool;

    /// Mute/unmute output
    fn set_muted(&mut self, muted: bool);

    /// Check if paused
    fn paused(&self) -> bool;

    /// Check if the end of the media was reached
    fn ended(&self) -> bool;

    /// Whether the sink can play the given MIME type on its own
    fn can_play_type(&self, mime_type: &str) -> bool;

    /// Assign (or clear) a source the sink plays directly
    fn set_source(&mut self, uri: Option<&str>);
}

/// Notifications emitted by the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    /// Playback position advanced
    TimeUpdate,

    /// End of media reached
    Ended,

    /// Playback started, possibly through native controls
    Play,

    /// Playback paused, possibly through native controls
    Pause,
}
