//! hls-player - playback-control core for adaptively streamed video
//!
//! The crate drives a media sink through either an adaptive streaming
//! engine or the sink's own native HLS support, and projects the
//! resulting state (renditions, playback, duration, volume, controls
//! visibility) for a UI to render.

pub mod engine;
pub mod player;
pub mod session;
pub mod sim;
pub mod sink;
pub mod utils;

pub use engine::{EngineEvent, EngineFactory, Level, StreamingEngine, AUTO_LEVEL};
pub use player::{
    MediaPlayer, MediaPlayerBuilder, PlaybackState, PlayerEvent, PlayerEventHandler,
    PlayerSnapshot, QualitySelection,
};
pub use session::{BackendKind, StreamSession};
pub use sink::{MediaSink, SinkEvent};
pub use utils::error::{PlayerError, Result};
