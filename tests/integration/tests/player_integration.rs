//! Integration tests for the hls-player facade
//!
//! These tests drive a `MediaPlayer` against the simulated environment:
//! - Session lifecycle and source switching
//! - Native fallback and unsupported sources
//! - Quality, playback, seek and volume behaviour
//! - Controls auto-hide and fullscreen

use anyhow::Result;
use hls_player::player::{ElementId, FullscreenHost, MediaPlayerBuilder, Rendition, VolumeState};
use hls_player::sim::{SimulatedEngineFactory, SimulatedSink};
use hls_player::utils::{Config, EngineConfig};
use hls_player::{
    BackendKind, EngineEvent, EngineFactory, PlaybackState, PlayerError, PlayerEvent,
    QualitySelection, SinkEvent, StreamingEngine, AUTO_LEVEL,
};
use hls_player_integration_tests::{record_events, TestRig, TOTAL};
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

mock! {
    pub Host {}
    impl FullscreenHost for Host {
        fn fullscreen_element(&self) -> Option<ElementId>;
        fn request_fullscreen(&mut self, element: &ElementId) -> hls_player::Result<()>;
        fn exit_fullscreen(&mut self) -> hls_player::Result<()>;
    }
}

mock! {
    pub Factory {}
    impl EngineFactory for Factory {
        fn is_supported(&self) -> bool;
        fn create(&self, config: &EngineConfig) -> hls_player::Result<Box<dyn StreamingEngine>>;
    }
}

fn rendition(height: u32, enabled: bool) -> Rendition {
    Rendition { height, enabled }
}

#[tokio::test]
async fn test_adaptive_session_lifecycle() -> Result<()> {
    let mut rig = TestRig::adaptive()?;
    assert_eq!(rig.player.playback_state(), PlaybackState::Paused);

    rig.open("https://cdn.example/a/master.m3u8");

    assert_eq!(rig.player.backend(), Some(BackendKind::Adaptive));
    assert_eq!(
        rig.player.renditions(),
        &[rendition(1080, true), rendition(720, true), rendition(480, true)]
    );
    assert_eq!(rig.player.selection(), QualitySelection::Auto);
    assert_eq!(rig.player.playback_state(), PlaybackState::Playing);
    assert_eq!(rig.player.duration().total, TOTAL);

    rig.run(5);
    assert_eq!(rig.player.duration().current, 5.0);
    assert_eq!(rig.player.playback_state(), PlaybackState::Playing);

    rig.player.unload();
    assert!(rig.player.uri().is_none());
    assert!(rig.player.renditions().is_empty());
    assert_eq!(rig.player.duration().total, 0.0);
    assert_eq!(rig.factory.log().attached(), 0);
    Ok(())
}

#[tokio::test]
async fn test_source_switch_never_double_attaches() -> Result<()> {
    let mut rig = TestRig::adaptive()?;

    rig.open("https://cdn.example/a.m3u8");
    rig.run(10);
    rig.open("https://cdn.example/b.m3u8");
    rig.open("https://cdn.example/b.m3u8");

    let log = rig.factory.log();
    assert_eq!(log.max_attached(), 1);
    assert_eq!(log.attached(), 1);
    assert_eq!(log.created(), 3);
    assert_eq!(log.destroyed(), 2);

    let entries = log.entries();
    let position = |entry: &str| entries.iter().position(|e| e == entry).unwrap();
    assert!(position("destroy #1") < position("create #2"));
    assert!(position("destroy #2") < position("create #3"));

    // Projections restart for the new source
    assert_eq!(rig.player.uri(), Some("https://cdn.example/b.m3u8"));
    assert_eq!(rig.player.duration().current, 0.0);

    drop(rig.player);
    assert_eq!(log.attached(), 0);
    assert_eq!(log.destroyed(), 3);
    Ok(())
}

#[tokio::test]
async fn test_failed_engine_load_leaves_player_idle() -> Result<()> {
    let mut rig = TestRig::adaptive()?;
    let (_subscription, events) = record_events(&rig.player);

    rig.factory.fail_next_load();
    rig.player.load(Some("https://cdn.example/broken.m3u8"));

    assert!(rig.player.uri().is_none());
    assert_eq!(rig.factory.log().attached(), 0);
    assert_eq!(rig.factory.log().destroyed(), 1);
    assert!(matches!(events.lock().last(), Some(PlayerEvent::Error { .. })));

    rig.open("https://cdn.example/ok.m3u8");
    assert_eq!(rig.player.backend(), Some(BackendKind::Adaptive));
    Ok(())
}

#[tokio::test]
async fn test_quality_selection_maps_to_engine_levels() -> Result<()> {
    let mut rig = TestRig::adaptive()?;
    rig.open("https://cdn.example/a.m3u8");
    assert_eq!(rig.player.engine_level(), Some(AUTO_LEVEL));

    assert!(rig.player.set_selection(QualitySelection::Fixed(720)));
    assert_eq!(rig.player.engine_level(), Some(2));
    assert_eq!(
        rig.player.renditions(),
        &[rendition(1080, false), rendition(720, true), rendition(480, false)]
    );

    // Unknown heights leave everything untouched
    assert!(!rig.player.set_selection(QualitySelection::Fixed(2160)));
    assert_eq!(rig.player.selection(), QualitySelection::Fixed(720));
    assert_eq!(rig.player.engine_level(), Some(2));

    assert!(rig.player.set_selection(QualitySelection::Auto));
    assert_eq!(rig.player.engine_level(), Some(AUTO_LEVEL));
    assert!(rig.player.renditions().iter().all(|r| r.enabled));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_heights_pick_first_level() -> Result<()> {
    let mut rig = TestRig::build(
        Config::default(),
        SimulatedEngineFactory::new(vec![720, 720, 360], TOTAL),
        SimulatedSink::new().with_duration(TOTAL),
    )?;
    rig.open("https://cdn.example/dup.m3u8");

    assert_eq!(rig.player.renditions(), &[rendition(720, true), rendition(360, true)]);
    assert!(rig.player.set_selection(QualitySelection::Fixed(720)));
    assert_eq!(rig.player.engine_level(), Some(0));
    assert!(rig.player.set_selection(QualitySelection::Fixed(360)));
    assert_eq!(rig.player.engine_level(), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_native_fallback() -> Result<()> {
    let mut rig = TestRig::native()?;
    rig.open("https://cdn.example/a.m3u8");

    assert_eq!(rig.player.backend(), Some(BackendKind::Native));
    assert_eq!(rig.sink.handle().lock().source.as_deref(), Some("https://cdn.example/a.m3u8"));
    assert_eq!(rig.factory.log().created(), 0);

    // No engine, no renditions, no autoplay
    rig.player.handle_engine_event(EngineEvent::ManifestParsed);
    assert!(rig.player.renditions().is_empty());
    assert!(!rig.player.set_selection(QualitySelection::Auto));
    assert_eq!(rig.sink.handle().lock().play_calls, 0);

    assert_eq!(rig.player.toggle_play(), PlaybackState::Playing);
    rig.run(3);
    assert_eq!(rig.player.duration().current, 3.0);
    assert_eq!(rig.player.duration().total, TOTAL);

    rig.player.unload();
    assert!(rig.sink.handle().lock().source.is_none());
    Ok(())
}

#[tokio::test]
async fn test_unsupported_source_stays_idle() -> Result<()> {
    let mut rig = TestRig::build(
        Config::default(),
        SimulatedEngineFactory::unsupported(),
        SimulatedSink::new(),
    )?;
    let (_subscription, events) = record_events(&rig.player);

    rig.player.load(Some("https://cdn.example/a.m3u8"));

    assert!(rig.player.uri().is_none());
    assert!(rig.player.backend().is_none());
    assert_eq!(rig.player.playback_state(), PlaybackState::Paused);
    assert!(rig.sink.handle().lock().source.is_none());

    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        PlayerEvent::Error { message } if message.contains("Unsupported format")
    ));
    Ok(())
}

#[tokio::test]
async fn test_blocked_autoplay_stays_paused() -> Result<()> {
    let mut rig = TestRig::build(
        Config::default(),
        SimulatedEngineFactory::new(vec![720], TOTAL),
        SimulatedSink::new().with_duration(TOTAL).with_autoplay_blocked(true),
    )?;
    rig.open("https://cdn.example/a.m3u8");

    assert_eq!(rig.sink.handle().lock().play_calls, 1);
    assert_eq!(rig.player.playback_state(), PlaybackState::Paused);
    assert_eq!(rig.player.toggle_play(), PlaybackState::Paused);
    Ok(())
}

#[tokio::test]
async fn test_autoplay_disabled() -> Result<()> {
    let mut config = Config::default();
    config.playback.autoplay = false;
    let mut rig = TestRig::build(
        config,
        SimulatedEngineFactory::new(vec![720], TOTAL),
        SimulatedSink::new().with_duration(TOTAL),
    )?;
    rig.open("https://cdn.example/a.m3u8");

    assert_eq!(rig.sink.handle().lock().play_calls, 0);
    assert_eq!(rig.player.playback_state(), PlaybackState::Paused);
    assert_eq!(rig.player.renditions().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_seek_clamps_to_media_length() -> Result<()> {
    let mut rig = TestRig::adaptive()?;
    rig.open("https://cdn.example/a.m3u8");

    rig.player.seek(45.5);
    assert_eq!(rig.player.duration().current, 45.5);
    assert_eq!(rig.player.playback_state(), PlaybackState::Playing);

    rig.player.seek(500.0);
    assert_eq!(rig.player.duration().current, TOTAL);

    rig.player.seek(-3.0);
    assert_eq!(rig.player.duration().current, 0.0);

    rig.player.seek(f64::NAN);
    assert_eq!(rig.player.duration().current, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_seek_before_level_loaded_stays_at_zero() -> Result<()> {
    let mut rig = TestRig::adaptive()?;
    rig.player.load(Some("https://cdn.example/a.m3u8"));
    rig.player.handle_engine_event(EngineEvent::ManifestParsed);

    rig.player.seek(30.0);
    assert_eq!(rig.player.duration().current, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_end_of_media_and_replay() -> Result<()> {
    let mut rig = TestRig::adaptive()?;
    rig.open("https://cdn.example/a.m3u8");

    rig.player.seek(TOTAL - 2.0);
    rig.run(5);
    assert_eq!(rig.player.playback_state(), PlaybackState::Ended);
    assert_eq!(rig.player.duration().current, TOTAL);

    // A stray time update does not leave Ended
    rig.player.handle_sink_event(SinkEvent::TimeUpdate);
    assert_eq!(rig.player.playback_state(), PlaybackState::Ended);

    assert_eq!(rig.player.toggle_play(), PlaybackState::Playing);
    rig.player.handle_sink_event(SinkEvent::TimeUpdate);
    assert_eq!(rig.player.duration().current, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_external_pause_is_reconciled() -> Result<()> {
    let mut rig = TestRig::adaptive()?;
    rig.open("https://cdn.example/a.m3u8");
    let (_subscription, events) = record_events(&rig.player);

    rig.sink.handle().lock().paused = true;
    rig.player.handle_sink_event(SinkEvent::Pause);

    assert_eq!(rig.player.playback_state(), PlaybackState::Paused);
    assert_eq!(
        events.lock().as_slice(),
        &[PlayerEvent::PlaybackStateChanged { state: PlaybackState::Paused }]
    );
    Ok(())
}

#[tokio::test]
async fn test_volume_and_mute() -> Result<()> {
    let mut rig = TestRig::adaptive()?;
    assert_eq!(rig.player.volume(), VolumeState { level: 100, muted: false });

    assert_eq!(rig.player.set_level(150), VolumeState { level: 100, muted: false });
    assert_eq!(rig.player.set_level(25), VolumeState { level: 25, muted: false });
    assert!((rig.sink.handle().lock().volume - 0.25).abs() < 1e-9);

    assert_eq!(rig.player.toggle_mute(), VolumeState { level: 0, muted: true });
    {
        let sink = rig.sink.handle();
        let sink = sink.lock();
        assert!(sink.muted);
        assert_eq!(sink.volume, 0.0);
    }

    // Unmuting goes to full volume, not back to 25
    assert_eq!(rig.player.toggle_mute(), VolumeState { level: 100, muted: false });
    assert_eq!(rig.player.set_level(-5), VolumeState { level: 0, muted: true });
    Ok(())
}

#[tokio::test]
async fn test_initial_volume_from_config() -> Result<()> {
    let mut config = Config::default();
    config.audio.initial_level = 40;
    let rig = TestRig::build(
        config,
        SimulatedEngineFactory::new(vec![720], TOTAL),
        SimulatedSink::new(),
    )?;

    assert_eq!(rig.player.volume(), VolumeState { level: 40, muted: false });
    assert!((rig.sink.handle().lock().volume - 0.4).abs() < 1e-9);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_controls_hide_after_idle() -> Result<()> {
    let mut rig = TestRig::adaptive()?;
    let mut visibility = rig.player.watch_controls();
    assert!(!rig.player.controls_visible());

    rig.player.on_activity();
    assert!(rig.player.controls_visible());

    sleep(Duration::from_millis(3000)).await;
    rig.player.on_activity();
    sleep(Duration::from_millis(4999)).await;
    assert!(rig.player.controls_visible());

    sleep(Duration::from_millis(2)).await;
    assert!(!rig.player.controls_visible());
    assert!(visibility.has_changed()?);
    assert!(!*visibility.borrow_and_update());

    rig.player.on_activity();
    rig.player.on_leave();
    assert!(!rig.player.controls_visible());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_source_switch_cancels_hide_timer() -> Result<()> {
    let mut rig = TestRig::adaptive()?;
    rig.open("https://cdn.example/a.m3u8");

    rig.player.on_activity();
    rig.open("https://cdn.example/b.m3u8");
    sleep(Duration::from_millis(6000)).await;

    // The overlay keeps its visibility until the next pointer event
    assert!(rig.player.controls_visible());

    rig.player.on_activity();
    sleep(Duration::from_millis(5001)).await;
    assert!(!rig.player.controls_visible());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_reloading_same_source_keeps_hide_timer() -> Result<()> {
    let mut rig = TestRig::adaptive()?;
    rig.open("https://cdn.example/a.m3u8");

    rig.player.on_activity();
    rig.open("https://cdn.example/a.m3u8");
    sleep(Duration::from_millis(5001)).await;

    assert!(!rig.player.controls_visible());
    Ok(())
}

#[tokio::test]
async fn test_source_switch_resets_fixed_selection() -> Result<()> {
    let mut rig = TestRig::adaptive()?;
    rig.open("https://cdn.example/a.m3u8");
    assert!(rig.player.set_selection(QualitySelection::Fixed(720)));
    let (_subscription, events) = record_events(&rig.player);

    rig.player.load(None);

    assert_eq!(rig.player.selection(), QualitySelection::Auto);
    assert_eq!(
        events.lock().as_slice(),
        &[
            PlayerEvent::SessionClosed,
            PlayerEvent::RenditionsChanged { renditions: Vec::new() },
            PlayerEvent::SelectionChanged { selection: QualitySelection::Auto },
            PlayerEvent::PlaybackStateChanged { state: PlaybackState::Paused },
            PlayerEvent::DurationChanged { duration: Default::default() },
        ]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_hide_timer() -> Result<()> {
    let mut rig = TestRig::adaptive()?;
    rig.open("https://cdn.example/a.m3u8");

    rig.player.on_activity();
    rig.player.shutdown();
    sleep(Duration::from_millis(10_000)).await;

    // The timer no longer runs, so the overlay keeps its last value
    assert!(rig.player.controls_visible());
    assert!(rig.player.uri().is_none());
    assert_eq!(rig.factory.log().attached(), 0);
    Ok(())
}

#[tokio::test]
async fn test_fullscreen_toggle() -> Result<()> {
    let mut rig = TestRig::adaptive()?;

    rig.player.toggle_fullscreen()?;
    assert_eq!(rig.fullscreen.current(), Some(ElementId::new("player")));

    rig.player.toggle_fullscreen()?;
    assert_eq!(rig.fullscreen.current(), None);
    Ok(())
}

#[tokio::test]
async fn test_fullscreen_uses_configured_container() -> Result<()> {
    let mut host = MockHost::new();
    host.expect_fullscreen_element().times(1).return_const(None::<ElementId>);
    host.expect_request_fullscreen()
        .withf(|element| element.0 == "stage")
        .times(1)
        .returning(|_| Ok(()));
    host.expect_exit_fullscreen().never();

    let mut player = MediaPlayerBuilder::new()
        .with_sink(SimulatedSink::new())
        .with_engine_factory(Arc::new(SimulatedEngineFactory::new(vec![720], TOTAL)))
        .with_fullscreen_host(host)
        .with_container(ElementId::new("stage"))
        .build()?;

    player.toggle_fullscreen()?;
    Ok(())
}

#[tokio::test]
async fn test_fullscreen_refusal_is_returned() -> Result<()> {
    let mut host = MockHost::new();
    host.expect_fullscreen_element().return_const(None::<ElementId>);
    host.expect_request_fullscreen()
        .returning(|_| Err(PlayerError::Fullscreen("not allowed".to_string())));

    let mut player = MediaPlayerBuilder::new()
        .with_sink(SimulatedSink::new())
        .with_engine_factory(Arc::new(SimulatedEngineFactory::new(vec![720], TOTAL)))
        .with_fullscreen_host(host)
        .build()?;

    assert!(matches!(player.toggle_fullscreen(), Err(PlayerError::Fullscreen(_))));
    Ok(())
}

#[tokio::test]
async fn test_native_fallback_never_creates_engine() -> Result<()> {
    let mut factory = MockFactory::new();
    factory.expect_is_supported().return_const(false);
    factory.expect_create().never();

    let sink = SimulatedSink::new().with_native_hls(true);
    let mut player = MediaPlayerBuilder::new()
        .with_sink(sink.clone())
        .with_engine_factory(Arc::new(factory))
        .with_fullscreen_host(hls_player::sim::SimulatedFullscreen::new())
        .build()?;

    player.load(Some("https://cdn.example/a.m3u8"));
    assert_eq!(player.backend(), Some(BackendKind::Native));
    Ok(())
}

#[tokio::test]
async fn test_snapshot_serializes() -> Result<()> {
    let mut rig = TestRig::adaptive()?;
    rig.open("https://cdn.example/a.m3u8");
    rig.player.set_selection(QualitySelection::Fixed(480));

    let json = serde_json::to_value(rig.player.snapshot())?;
    assert_eq!(json["uri"], "https://cdn.example/a.m3u8");
    assert_eq!(json["backend"], "adaptive");
    assert_eq!(json["playback_state"], "playing");
    assert_eq!(json["selection"]["fixed"], 480);
    assert_eq!(json["renditions"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["volume"]["level"], 100);
    Ok(())
}
