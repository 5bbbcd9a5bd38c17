//! High-level media player API for hls-player
//!
//! `MediaPlayer` owns the sink and composes the session, quality, playback,
//! volume, controls and fullscreen controllers into one unit per mounted
//! player. The host's event loop feeds it engine and sink notifications;
//! the UI calls its intent methods and reads its observable state.

use crate::engine::{EngineEvent, EngineFactory};
use crate::internal_error;
use crate::player::{
    ControlsVisibility, ElementId, FullscreenController, FullscreenHost, PlaybackController,
    PlaybackDuration, PlaybackState, PlayerEvent, PlayerEventHandler, PlayerSnapshot,
    QualityController, QualitySelection, Rendition, VolumeController, VolumeState,
};
use crate::session::{BackendKind, StreamSession};
use crate::sink::{MediaSink, SinkEvent};
use crate::utils::config::Config;
use crate::utils::error::{PlayerError, Result};

use log::{debug, error, info, warn};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Media player builder for customized configuration
pub struct MediaPlayerBuilder {
    config: Config,
    sink: Option<Box<dyn MediaSink>>,
    engine_factory: Option<Arc<dyn EngineFactory>>,
    fullscreen_host: Option<Box<dyn FullscreenHost>>,
    container: ElementId,
    runtime: Option<Handle>,
    event_handlers: Vec<Box<dyn PlayerEventHandler>>,
}

impl Default for MediaPlayerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaPlayerBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            sink: None,
            engine_factory: None,
            fullscreen_host: None,
            container: ElementId::new("player"),
            runtime: None,
            event_handlers: Vec::new(),
        }
    }

    /// Set player configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the media sink the player drives
    pub fn with_sink(mut self, sink: impl MediaSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Set the adaptive engine backend
    pub fn with_engine_factory(mut self, factory: Arc<dyn EngineFactory>) -> Self {
        self.engine_factory = Some(factory);
        self
    }

    /// Set the host fullscreen capability
    pub fn with_fullscreen_host(mut self, host: impl FullscreenHost + 'static) -> Self {
        self.fullscreen_host = Some(Box::new(host));
        self
    }

    /// Element that goes fullscreen (defaults to `player`)
    pub fn with_container(mut self, container: ElementId) -> Self {
        self.container = container;
        self
    }

    /// Runtime for the controls hide timer (defaults to the current one)
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Add an event handler
    pub fn with_event_handler(mut self, handler: Box<dyn PlayerEventHandler>) -> Self {
        self.event_handlers.push(handler);
        self
    }

    /// Build the media player
    pub fn build(self) -> Result<MediaPlayer> {
        MediaPlayer::new_with_builder(self)
    }
}

/// One mounted player
pub struct MediaPlayer {
    config: Config,
    sink: Box<dyn MediaSink>,
    session: StreamSession,
    quality: QualityController,
    playback: PlaybackController,
    volume: VolumeController,
    controls: ControlsVisibility,
    fullscreen: FullscreenController,
    fullscreen_host: Box<dyn FullscreenHost>,
    event_handlers: Vec<Box<dyn PlayerEventHandler>>,
    event_dispatcher: EventDispatcher,
}

impl MediaPlayer {
    fn new_with_builder(builder: MediaPlayerBuilder) -> Result<Self> {
        info!("Initializing media player");
        builder.config.validate()?;

        let mut sink = builder
            .sink
            .ok_or_else(|| PlayerError::InvalidInput("a media sink is required".to_string()))?;
        let factory = builder
            .engine_factory
            .ok_or_else(|| PlayerError::InvalidInput("an engine factory is required".to_string()))?;
        let fullscreen_host = builder
            .fullscreen_host
            .ok_or_else(|| PlayerError::InvalidInput("a fullscreen host is required".to_string()))?;
        let runtime = match builder.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current()
                .map_err(|e| internal_error!("controls timer needs a tokio runtime: {}", e))?,
        };

        let config = builder.config;
        let session = StreamSession::new(
            factory,
            config.engine.clone(),
            config.playback.native_mime_type.clone(),
        );

        let mut volume = VolumeController::new();
        volume.set_level(i32::from(config.audio.initial_level), sink.as_mut());

        Ok(Self {
            controls: ControlsVisibility::new(config.controls.hide_delay(), runtime),
            fullscreen: FullscreenController::new(builder.container),
            config,
            sink,
            session,
            quality: QualityController::new(),
            playback: PlaybackController::new(),
            volume,
            fullscreen_host,
            event_handlers: builder.event_handlers,
            event_dispatcher: EventDispatcher::new(),
        })
    }

    /// Play `uri`, replacing whatever was loaded
    ///
    /// `None` or an empty URI leaves the player idle. A source nothing can
    /// play is logged and reported as `PlayerEvent::Error`; it never fails
    /// the call. Switching to a different source drops the pending controls
    /// hide; the overlay keeps its current visibility until the next pointer
    /// activity or leave.
    pub fn load(&mut self, uri: Option<&str>) {
        let uri = uri.filter(|uri| !uri.is_empty());
        if self.session.uri() != uri {
            self.controls.cancel_pending();
        }
        self.close_session();

        let Some(uri) = uri else {
            debug!("No source, player stays idle");
            return;
        };

        match self.session.open(uri, self.sink.as_mut()) {
            Ok(backend) => self.emit(PlayerEvent::SessionOpened {
                uri: uri.to_string(),
                backend,
            }),
            Err(e) => {
                warn!("Cannot play {}: {}", uri, e);
                self.emit(PlayerEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    /// Close the current session and return to idle
    pub fn unload(&mut self) {
        self.load(None);
    }

    /// Tear everything down, as on unmount
    pub fn shutdown(&mut self) {
        self.controls.cancel_pending();
        self.close_session();
    }

    fn close_session(&mut self) {
        let was_open = self.session.is_open();
        self.session.close(self.sink.as_mut());

        let before = (self.playback.state(), self.playback.duration());
        let had_renditions = !self.quality.renditions().is_empty();
        let previous_selection = self.quality.selection();
        self.playback.reset();
        self.quality.clear();

        if was_open {
            self.emit(PlayerEvent::SessionClosed);
        }
        if had_renditions {
            self.emit(PlayerEvent::RenditionsChanged { renditions: Vec::new() });
        }
        let selection = self.quality.selection();
        if selection != previous_selection {
            self.emit(PlayerEvent::SelectionChanged { selection });
        }
        self.publish_playback(before);
    }

    /// Dispatch a notification from the engine of the current session
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        if self.session.backend_kind() != Some(BackendKind::Adaptive) {
            debug!("Ignoring {:?} outside an adaptive session", event);
            return;
        }

        let before = (self.playback.state(), self.playback.duration());
        match event {
            EngineEvent::ManifestParsed => {
                let levels = self.session.levels().unwrap_or_default();
                self.quality.reset_from_levels(&levels);
                self.emit(PlayerEvent::RenditionsChanged {
                    renditions: self.quality.renditions().to_vec(),
                });
                self.emit(PlayerEvent::SelectionChanged {
                    selection: self.quality.selection(),
                });

                if self.config.playback.autoplay {
                    self.playback.start(self.sink.as_mut());
                }
            }
            EngineEvent::LevelLoaded { total_duration } => {
                self.playback.on_level_loaded(total_duration, self.sink.as_ref());
            }
        }
        self.publish_playback(before);
    }

    /// Dispatch a notification from the sink
    pub fn handle_sink_event(&mut self, event: SinkEvent) {
        let before = (self.playback.state(), self.playback.duration());
        match event {
            SinkEvent::TimeUpdate => {
                let track_total = self.session.backend_kind() == Some(BackendKind::Native);
                self.playback.on_time_update(self.sink.as_ref(), track_total);
            }
            SinkEvent::Ended => self.playback.on_ended(self.sink.as_ref()),
            SinkEvent::Play | SinkEvent::Pause => {
                self.playback.on_play_state_changed(self.sink.as_ref())
            }
        }
        self.publish_playback(before);
    }

    /// Surface an engine failure the host observed
    ///
    /// There is no recovery: the session is left as it is.
    pub fn report_engine_error(&mut self, error: PlayerError) {
        error!("Engine failure on {:?}: {}", self.session.uri(), error);
        self.emit(PlayerEvent::Error {
            message: error.to_string(),
        });
    }

    /// Pick a rendition or go back to automatic switching
    ///
    /// Returns whether the selection was applied; unknown heights and
    /// sessions without an engine are ignored.
    pub fn set_selection(&mut self, selection: QualitySelection) -> bool {
        let applied = match self.session.engine_mut() {
            Some(engine) => self.quality.set_selection(selection, engine),
            None => {
                debug!("Ignoring quality selection without an adaptive engine");
                false
            }
        };

        if applied {
            self.emit(PlayerEvent::RenditionsChanged {
                renditions: self.quality.renditions().to_vec(),
            });
            self.emit(PlayerEvent::SelectionChanged { selection });
        }
        applied
    }

    /// Play when paused or ended, pause when playing
    pub fn toggle_play(&mut self) -> PlaybackState {
        let before = (self.playback.state(), self.playback.duration());
        let state = self.playback.toggle(self.sink.as_mut());
        self.publish_playback(before);
        state
    }

    /// Seek to `seconds`, clamped to the media length
    pub fn seek(&mut self, seconds: f64) {
        let before = (self.playback.state(), self.playback.duration());
        self.playback.seek(seconds, self.sink.as_mut());
        self.publish_playback(before);
    }

    /// Set the volume level (clamped to 0 - 100)
    pub fn set_level(&mut self, level: i32) -> VolumeState {
        let volume = self.volume.set_level(level, self.sink.as_mut());
        self.emit(PlayerEvent::VolumeChanged { volume });
        volume
    }

    /// Toggle between muted and full volume
    pub fn toggle_mute(&mut self) -> VolumeState {
        let volume = self.volume.toggle_mute(self.sink.as_mut());
        self.emit(PlayerEvent::VolumeChanged { volume });
        volume
    }

    /// Pointer activity over the player or its menus
    pub fn on_activity(&mut self) {
        self.controls.on_activity();
    }

    /// Pointer left the player
    pub fn on_leave(&mut self) {
        self.controls.on_leave();
    }

    /// Enter or leave fullscreen
    pub fn toggle_fullscreen(&mut self) -> Result<()> {
        self.fullscreen.toggle(self.fullscreen_host.as_mut())
    }

    pub fn uri(&self) -> Option<&str> {
        self.session.uri()
    }

    pub fn backend(&self) -> Option<BackendKind> {
        self.session.backend_kind()
    }

    /// Engine level index currently requested, for diagnostics
    pub fn engine_level(&self) -> Option<i32> {
        self.session.engine_level()
    }

    pub fn renditions(&self) -> &[Rendition] {
        self.quality.renditions()
    }

    pub fn selection(&self) -> QualitySelection {
        self.quality.selection()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn duration(&self) -> PlaybackDuration {
        self.playback.duration()
    }

    pub fn volume(&self) -> VolumeState {
        self.volume.state()
    }

    pub fn controls_visible(&self) -> bool {
        self.controls.is_visible()
    }

    /// Receiver for controls visibility, including timer-driven hides
    pub fn watch_controls(&self) -> watch::Receiver<bool> {
        self.controls.subscribe()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Copy of all observable state
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            uri: self.uri().map(str::to_string),
            backend: self.backend(),
            renditions: self.renditions().to_vec(),
            selection: self.selection(),
            playback_state: self.playback_state(),
            duration: self.duration(),
            volume: self.volume(),
            controls_visible: self.controls_visible(),
        }
    }

    /// Add event handler
    pub fn add_event_handler(&mut self, handler: Box<dyn PlayerEventHandler>) {
        self.event_handlers.push(handler);
    }

    /// Subscribe to events; the callback is removed when the returned
    /// subscription is dropped
    pub fn subscribe_events<F>(&self, callback: F) -> EventSubscription
    where
        F: Fn(PlayerEvent) + Send + Sync + 'static,
    {
        self.event_dispatcher.subscribe(callback)
    }

    fn publish_playback(&mut self, before: (PlaybackState, PlaybackDuration)) {
        let (state, duration) = (self.playback.state(), self.playback.duration());
        if state != before.0 {
            info!("Playback state changed to: {:?}", state);
            self.emit(PlayerEvent::PlaybackStateChanged { state });
        }
        if duration != before.1 {
            self.emit(PlayerEvent::DurationChanged { duration });
        }
    }

    /// Send event to handlers and subscribers
    fn emit(&mut self, event: PlayerEvent) {
        for handler in self.event_handlers.iter_mut() {
            handler.handle_event(event.clone());
        }
        self.event_dispatcher.dispatch(event);
    }
}

impl Drop for MediaPlayer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

type Subscriber = Box<dyn Fn(PlayerEvent) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(u64, Subscriber)>,
}

/// Event dispatcher
struct EventDispatcher {
    subscribers: Arc<RwLock<Subscribers>>,
}

impl EventDispatcher {
    fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Subscribers::default())),
        }
    }

    fn subscribe<F>(&self, callback: F) -> EventSubscription
    where
        F: Fn(PlayerEvent) + Send + Sync + 'static,
    {
        let mut subs = self.subscribers.write();
        let id = subs.next_id;
        subs.next_id += 1;
        subs.entries.push((id, Box::new(callback)));

        EventSubscription {
            id,
            dispatcher: Arc::downgrade(&self.subscribers),
        }
    }

    fn dispatch(&self, event: PlayerEvent) {
        let subs = self.subscribers.read();
        for (_, callback) in subs.entries.iter() {
            callback(event.clone());
        }
    }
}

/// Event subscription handle
pub struct EventSubscription {
    id: u64,
    dispatcher: Weak<RwLock<Subscribers>>,
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.dispatcher.upgrade() {
            subscribers.write().entries.retain(|(id, _)| *id != self.id);
        }
    }
}
