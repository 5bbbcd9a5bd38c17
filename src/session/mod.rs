//! Stream session module for hls-player
//!
//! A session binds one source URI to the media sink, either through an
//! adaptive streaming engine instance or, when the engine backend is not
//! available, by handing the URI to the sink directly. The session slot
//! guarantees that at most one engine instance is ever attached to the sink.

use crate::engine::{EngineFactory, Level, StreamingEngine};
use crate::sink::MediaSink;
use crate::utils::config::EngineConfig;
use crate::utils::error::{PlayerError, Result};
use log::{debug, info, warn};
use std::sync::Arc;

/// How the current source reaches the sink
pub enum SessionBackend {
    /// An engine instance fetches segments and feeds the sink
    AdaptiveEngine(Box<dyn StreamingEngine>),

    /// The sink plays the URI itself; no rendition discovery
    NativeFallback,
}

/// Backend kind without the engine handle, for observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Adaptive,
    Native,
}

impl SessionBackend {
    /// Kind of this backend
    pub fn kind(&self) -> BackendKind {
        match self {
            SessionBackend::AdaptiveEngine(_) => BackendKind::Adaptive,
            SessionBackend::NativeFallback => BackendKind::Native,
        }
    }
}

/// Single session slot for one sink
pub struct StreamSession {
    factory: Arc<dyn EngineFactory>,
    engine_config: EngineConfig,
    native_mime_type: String,

    /// Live backend and the URI it was opened for
    active: Option<(String, SessionBackend)>,
}

impl StreamSession {
    /// Create an empty session slot
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        engine_config: EngineConfig,
        native_mime_type: impl Into<String>,
    ) -> Self {
        Self {
            factory,
            engine_config,
            native_mime_type: native_mime_type.into(),
            active: None,
        }
    }

    /// Open `uri` on `sink`
    ///
    /// Any session already open is torn down first, even for the same URI,
    /// so the outgoing engine is destroyed before the next one exists. On
    /// `UnsupportedFormat` the slot stays empty.
    pub fn open(&mut self, uri: &str, sink: &mut dyn MediaSink) -> Result<BackendKind> {
        self.close(sink);

        let backend = if self.factory.is_supported() {
            let mut engine = self.factory.create(&self.engine_config)?;
            if let Err(e) = Self::bind(engine.as_mut(), uri, sink) {
                engine.detach_media();
                engine.destroy();
                return Err(e);
            }
            SessionBackend::AdaptiveEngine(engine)
        } else if sink.can_play_type(&self.native_mime_type) {
            sink.set_source(Some(uri));
            SessionBackend::NativeFallback
        } else {
            warn!("No playback path for {}", uri);
            return Err(PlayerError::UnsupportedFormat(uri.to_string()));
        };

        let kind = backend.kind();
        info!("Opened {:?} session for {}", kind, uri);
        self.active = Some((uri.to_string(), backend));
        Ok(kind)
    }

    fn bind(engine: &mut dyn StreamingEngine, uri: &str, sink: &mut dyn MediaSink) -> Result<()> {
        engine.load_source(uri)?;
        engine.attach_media(sink)
    }

    /// Tear down the current session; does nothing when the slot is empty
    pub fn close(&mut self, sink: &mut dyn MediaSink) {
        let Some((uri, backend)) = self.active.take() else {
            return;
        };

        match backend {
            SessionBackend::AdaptiveEngine(mut engine) => {
                engine.detach_media();
                engine.destroy();
            }
            SessionBackend::NativeFallback => sink.set_source(None),
        }
        info!("Closed session for {}", uri);
    }

    /// Whether a session is open
    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// URI of the open session
    pub fn uri(&self) -> Option<&str> {
        self.active.as_ref().map(|(uri, _)| uri.as_str())
    }

    /// Backend kind of the open session
    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.active.as_ref().map(|(_, backend)| backend.kind())
    }

    /// The engine instance, when the session is adaptive
    pub fn engine_mut(&mut self) -> Option<&mut (dyn StreamingEngine + 'static)> {
        match self.active.as_mut() {
            Some((_, SessionBackend::AdaptiveEngine(engine))) => Some(engine.as_mut()),
            _ => None,
        }
    }

    /// Level index the engine is pinned to (`AUTO_LEVEL` for automatic)
    pub fn engine_level(&self) -> Option<i32> {
        match self.active.as_ref() {
            Some((_, SessionBackend::AdaptiveEngine(engine))) => Some(engine.current_level()),
            _ => None,
        }
    }

    /// Levels advertised by the engine, `None` outside an adaptive session
    pub fn levels(&self) -> Option<Vec<Level>> {
        match self.active.as_ref() {
            Some((_, SessionBackend::AdaptiveEngine(engine))) => Some(engine.levels()),
            Some((uri, SessionBackend::NativeFallback)) => {
                debug!("Native session for {} has no levels", uri);
                None
            }
            None => None,
        }
    }
}
