//! Configuration loading as seen by a player

use anyhow::Result;
use hls_player::sim::{SimulatedEngineFactory, SimulatedFullscreen, SimulatedSink};
use hls_player::utils::Config;
use hls_player::{MediaPlayerBuilder, PlayerError};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn clear_env() {
    for name in [
        "HLS_PLAYER_INITIAL_VOLUME",
        "HLS_PLAYER_HIDE_DELAY_MS",
        "HLS_PLAYER_AUTOPLAY",
        "HLS_PLAYER_LOG_LEVEL",
    ] {
        std::env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_file_then_env_overrides() -> Result<()> {
    clear_env();
    let dir = TempDir::new()?;
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[audio]\ninitial_level = 30\n\n[controls]\nhide_delay_ms = 2500\n",
    )?;

    let config = Config::load_from(&path)?;
    assert_eq!(config.audio.initial_level, 30);
    assert_eq!(config.controls.hide_delay(), Duration::from_millis(2500));
    assert!(config.playback.autoplay);

    std::env::set_var("HLS_PLAYER_HIDE_DELAY_MS", "750");
    std::env::set_var("HLS_PLAYER_AUTOPLAY", "false");
    let config = Config::load_from(&path)?;
    clear_env();

    assert_eq!(config.controls.hide_delay_ms, 750);
    assert!(!config.playback.autoplay);
    Ok(())
}

#[test]
#[serial]
fn test_invalid_env_override_is_rejected() -> Result<()> {
    clear_env();
    let dir = TempDir::new()?;
    let path = dir.path().join("config.toml");
    Config::default().save_to(&path)?;

    std::env::set_var("HLS_PLAYER_INITIAL_VOLUME", "loud");
    let result = Config::load_from(&path);
    clear_env();

    assert!(matches!(result, Err(PlayerError::Config(_))));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_invalid_config_fails_build() -> Result<()> {
    let mut config = Config::default();
    config.controls.hide_delay_ms = 0;

    let result = MediaPlayerBuilder::new()
        .with_config(config)
        .with_sink(SimulatedSink::new())
        .with_engine_factory(Arc::new(SimulatedEngineFactory::new(vec![720], 60.0)))
        .with_fullscreen_host(SimulatedFullscreen::new())
        .build();

    assert!(matches!(result, Err(PlayerError::Config(_))));
    Ok(())
}
