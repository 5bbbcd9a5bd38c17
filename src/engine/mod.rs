//! Adaptive streaming engine boundary for hls-player
//!
//! The engine fetches the manifest and segments and feeds them to the
//! sink. Its network and decoding internals are opaque here; only the
//! observable contract below is relied on.

use crate::sink::MediaSink;
use crate::utils::config::EngineConfig;
use crate::utils::error::Result;

/// Engine level index meaning "let the engine decide"
pub const AUTO_LEVEL: i32 = -1;

/// One bitrate/resolution variant as advertised by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    /// Vertical resolution in pixels
    pub height: u32,
}

/// One live adaptive streaming engine instance
pub trait StreamingEngine: Send {
    /// Start loading the manifest at `uri`
    fn load_source(&mut self, uri: &str) -> Result<()>;

    /// Bind the engine to the sink it feeds
    fn attach_media(&mut self, sink: &mut dyn MediaSink) -> Result<()>;

    /// Release the sink
    fn detach_media(&mut self);

    /// Tear the instance down, cancelling its in-flight fetches
    fn destroy(&mut self);

    /// Current level index, `AUTO_LEVEL` when adaptive
    fn current_level(&self) -> i32;

    /// Force a level index, or `AUTO_LEVEL` to resume adaptive switching
    fn set_current_level(&mut self, index: i32);

    /// Levels in the engine's own order, duplicates included
    fn levels(&self) -> Vec<Level>;
}

/// Constructs engine instances
pub trait EngineFactory: Send + Sync {
    /// Whether the engine backend works in this host at all
    fn is_supported(&self) -> bool;

    /// Build a fresh instance
    fn create(&self, config: &EngineConfig) -> Result<Box<dyn StreamingEngine>>;
}

/// Notifications emitted by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// The manifest was parsed and `levels()` is populated
    ManifestParsed,

    /// A level's segment list was loaded
    LevelLoaded {
        /// Total media duration from the segment metadata, in seconds
        total_duration: f64,
    },
}
