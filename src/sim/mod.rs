//! Headless simulation backend for hls-player
//!
//! In-memory implementations of the sink, engine and fullscreen boundaries.
//! They keep their state behind shared handles so a driver (the CLI, or a
//! test) can inspect what the player did and play the host's part by
//! advancing the clock and dispatching events.

use crate::engine::{EngineFactory, Level, StreamingEngine, AUTO_LEVEL};
use crate::player::fullscreen::{ElementId, FullscreenHost};
use crate::sink::{MediaSink, SinkEvent};
use crate::utils::config::{EngineConfig, HLS_MIME_TYPE};
use crate::utils::error::{PlayerError, Result};
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;

/// Observable state of a `SimulatedSink`
#[derive(Debug, Clone)]
pub struct SinkState {
    pub current_time: f64,
    pub duration: f64,
    pub volume: f64,
    pub muted: bool,
    pub paused: bool,
    pub ended: bool,
    pub source: Option<String>,
    pub native_hls: bool,
    pub autoplay_blocked: bool,
    pub play_calls: u32,
}

impl Default for SinkState {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            muted: false,
            paused: true,
            ended: false,
            source: None,
            native_hls: false,
            autoplay_blocked: false,
            play_calls: 0,
        }
    }
}

/// Shared handle onto a simulated sink's state
pub type SinkHandle = Arc<Mutex<SinkState>>;

/// Media sink with a virtual clock
#[derive(Debug, Clone, Default)]
pub struct SimulatedSink {
    state: SinkHandle,
}

impl SimulatedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report native HLS support from `can_play_type`
    pub fn with_native_hls(self, native_hls: bool) -> Self {
        self.state.lock().native_hls = native_hls;
        self
    }

    /// Refuse every `play()` request, like a host enforcing an autoplay policy
    pub fn with_autoplay_blocked(self, blocked: bool) -> Self {
        self.state.lock().autoplay_blocked = blocked;
        self
    }

    /// Set the media duration the sink reports
    pub fn with_duration(self, duration: f64) -> Self {
        self.state.lock().duration = duration;
        self
    }

    pub fn handle(&self) -> SinkHandle {
        Arc::clone(&self.state)
    }

    /// Advance the virtual clock and return the notifications a real sink
    /// would have fired
    pub fn advance(&self, seconds: f64) -> Vec<SinkEvent> {
        let mut state = self.state.lock();
        if state.paused || seconds <= 0.0 {
            return Vec::new();
        }

        state.current_time += seconds;
        if state.duration.is_finite() && state.current_time >= state.duration {
            state.current_time = state.duration;
            state.paused = true;
            state.ended = true;
            return vec![SinkEvent::TimeUpdate, SinkEvent::Pause, SinkEvent::Ended];
        }
        vec![SinkEvent::TimeUpdate]
    }
}

impl MediaSink for SimulatedSink {
    fn play(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        state.play_calls += 1;
        if state.autoplay_blocked {
            return Err(PlayerError::sink_error("play() refused by autoplay policy"));
        }
        if state.ended {
            // Media elements restart from the beginning once ended
            state.current_time = 0.0;
            state.ended = false;
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.lock().paused = true;
    }

    fn current_time(&self) -> f64 {
        self.state.lock().current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut state = self.state.lock();
        state.current_time = seconds.max(0.0);
        if state.duration.is_finite() {
            state.current_time = state.current_time.min(state.duration);
            state.ended = state.ended && state.current_time >= state.duration;
        } else {
            state.ended = false;
        }
    }

    fn duration(&self) -> f64 {
        self.state.lock().duration
    }

    fn volume(&self) -> f64 {
        self.state.lock().volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.state.lock().volume = volume.clamp(0.0, 1.0);
    }

    fn muted(&self) -> bool {
        self.state.lock().muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.state.lock().muted = muted;
    }

    fn paused(&self) -> bool {
        self.state.lock().paused
    }

    fn ended(&self) -> bool {
        self.state.lock().ended
    }

    fn can_play_type(&self, mime_type: &str) -> bool {
        self.state.lock().native_hls && mime_type == HLS_MIME_TYPE
    }

    fn set_source(&mut self, uri: Option<&str>) {
        let mut state = self.state.lock();
        state.source = uri.map(str::to_string);
        state.current_time = 0.0;
        state.paused = true;
        state.ended = false;
    }
}

/// Lifecycle record shared by a factory and every engine it builds
#[derive(Debug, Default)]
struct EngineLogState {
    created: u32,
    destroyed: u32,
    attached: u32,
    max_attached: u32,
    fail_next_load: bool,
    entries: Vec<String>,
}

/// Read access to the lifecycle record
#[derive(Debug, Clone, Default)]
pub struct EngineLog(Arc<Mutex<EngineLogState>>);

impl EngineLog {
    pub fn created(&self) -> u32 {
        self.0.lock().created
    }

    pub fn destroyed(&self) -> u32 {
        self.0.lock().destroyed
    }

    /// Engines currently attached to the sink
    pub fn attached(&self) -> u32 {
        self.0.lock().attached
    }

    /// Highest number of simultaneously attached engines ever observed
    pub fn max_attached(&self) -> u32 {
        self.0.lock().max_attached
    }

    /// Ordered lifecycle entries such as `"attach #2"`
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().entries.clone()
    }

    fn record(&self, entry: String) {
        debug!("sim engine: {}", entry);
        self.0.lock().entries.push(entry);
    }
}

/// Engine factory producing `SimulatedEngine`s with a fixed level ladder
#[derive(Debug, Clone)]
pub struct SimulatedEngineFactory {
    supported: bool,
    heights: Vec<u32>,
    total_duration: f64,
    log: EngineLog,
}

impl SimulatedEngineFactory {
    /// Factory whose engines advertise `heights` (in engine order) and
    /// report `total_duration` seconds
    pub fn new(heights: Vec<u32>, total_duration: f64) -> Self {
        Self {
            supported: true,
            heights,
            total_duration,
            log: EngineLog::default(),
        }
    }

    /// Factory for a host without the engine backend
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(Vec::new(), 0.0)
        }
    }

    pub fn log(&self) -> EngineLog {
        self.log.clone()
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Make the next `load_source` call fail
    pub fn fail_next_load(&self) {
        self.log.0.lock().fail_next_load = true;
    }
}

impl EngineFactory for SimulatedEngineFactory {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self, config: &EngineConfig) -> Result<Box<dyn StreamingEngine>> {
        if !self.supported {
            return Err(PlayerError::engine_error("engine backend not supported"));
        }

        let id = {
            let mut log = self.log.0.lock();
            log.created += 1;
            log.created
        };
        self.log.record(format!("create #{}", id));

        Ok(Box::new(SimulatedEngine {
            id,
            levels: self.heights.iter().map(|&height| Level { height }).collect(),
            current_level: config.start_level,
            attached: false,
            destroyed: false,
            log: self.log.clone(),
        }))
    }
}

/// In-memory engine instance
#[derive(Debug)]
pub struct SimulatedEngine {
    id: u32,
    levels: Vec<Level>,
    current_level: i32,
    attached: bool,
    destroyed: bool,
    log: EngineLog,
}

impl StreamingEngine for SimulatedEngine {
    fn load_source(&mut self, uri: &str) -> Result<()> {
        let fail = std::mem::take(&mut self.log.0.lock().fail_next_load);
        if fail {
            return Err(PlayerError::engine_error(format!("manifest request failed for {}", uri)));
        }
        self.log.record(format!("load #{} {}", self.id, uri));
        Ok(())
    }

    fn attach_media(&mut self, sink: &mut dyn MediaSink) -> Result<()> {
        if self.destroyed {
            return Err(PlayerError::engine_error("engine already destroyed"));
        }
        if !self.attached {
            // The engine feeds the sink through its own media source
            sink.set_source(Some(&format!("mediasource:engine-{}", self.id)));
            self.attached = true;
            let mut log = self.log.0.lock();
            log.attached += 1;
            log.max_attached = log.max_attached.max(log.attached);
        }
        self.log.record(format!("attach #{}", self.id));
        Ok(())
    }

    fn detach_media(&mut self) {
        if self.attached {
            self.attached = false;
            self.log.0.lock().attached -= 1;
            self.log.record(format!("detach #{}", self.id));
        }
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.detach_media();
        self.destroyed = true;
        self.log.0.lock().destroyed += 1;
        self.log.record(format!("destroy #{}", self.id));
    }

    fn current_level(&self) -> i32 {
        self.current_level
    }

    fn set_current_level(&mut self, index: i32) {
        self.current_level = if index < 0 { AUTO_LEVEL } else { index };
    }

    fn levels(&self) -> Vec<Level> {
        self.levels.clone()
    }
}

/// Fullscreen host tracking a single fullscreen element
#[derive(Debug, Clone, Default)]
pub struct SimulatedFullscreen {
    element: Arc<Mutex<Option<ElementId>>>,
    refuse_requests: bool,
}

impl SimulatedFullscreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every fullscreen request, like a host outside a user gesture
    pub fn refusing() -> Self {
        Self {
            refuse_requests: true,
            ..Self::default()
        }
    }

    pub fn current(&self) -> Option<ElementId> {
        self.element.lock().clone()
    }
}

impl FullscreenHost for SimulatedFullscreen {
    fn fullscreen_element(&self) -> Option<ElementId> {
        self.element.lock().clone()
    }

    fn request_fullscreen(&mut self, element: &ElementId) -> Result<()> {
        if self.refuse_requests {
            return Err(PlayerError::Fullscreen(format!("request for {} denied", element)));
        }
        *self.element.lock() = Some(element.clone());
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        self.element.lock().take();
        Ok(())
    }
}
