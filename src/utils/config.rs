//! Configuration management for hls-player
//!
//! This module handles loading and managing player configuration
//! from config files and environment variables.

use crate::utils::error::{IntoPlayerError, PlayerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// MIME type checked on the sink when the adaptive engine is unavailable
pub const HLS_MIME_TYPE: &str = "application/vnd.apple.mpegurl";

/// Main player configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Adaptive engine tuning
    pub engine: EngineConfig,

    /// Playback behaviour
    pub playback: PlaybackConfig,

    /// Audio configuration
    pub audio: AudioConfig,

    /// On-screen controls configuration
    pub controls: ControlsConfig,

    /// General settings
    pub general: GeneralConfig,
}

/// Tuning handed to every adaptive engine instance on construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial level index (-1 lets the engine pick)
    pub start_level: i32,

    /// Never pick a level taller than the playback surface
    pub cap_level_to_player_size: bool,

    /// Measure bandwidth before the first level switch
    pub test_bandwidth: bool,

    /// Fast EWMA half-life for live streams, in seconds
    pub abr_ewma_fast_live: f64,

    /// Slow EWMA half-life for live streams, in seconds
    pub abr_ewma_slow_live: f64,

    /// Bandwidth safety factor when staying on or dropping a level
    pub abr_bandwidth_factor: f64,

    /// Bandwidth safety factor when switching up
    pub abr_bandwidth_up_factor: f64,

    /// Maximum tolerated starvation delay, in seconds
    pub max_starvation_delay: f64,
}

/// Playback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Start playing as soon as the manifest is parsed
    pub autoplay: bool,

    /// MIME type the sink must accept for the native fallback
    pub native_mime_type: String,
}

/// Audio configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Volume level applied when the player is built (0 - 100)
    pub initial_level: u8,
}

/// Controls overlay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Idle time before the overlay hides, in milliseconds
    pub hide_delay_ms: u64,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_level: -1,
            cap_level_to_player_size: true,
            test_bandwidth: true,
            abr_ewma_fast_live: 5.0,
            abr_ewma_slow_live: 9.0,
            abr_bandwidth_factor: 0.8,
            abr_bandwidth_up_factor: 0.7,
            max_starvation_delay: 4.0,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            autoplay: true,
            native_mime_type: HLS_MIME_TYPE.to_string(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { initial_level: 100 }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self { hide_delay_ms: 5000 }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl ControlsConfig {
    /// Hide delay as a `Duration`
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }
}

impl Config {
    /// Load configuration from various sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. System config file (/etc/hls-player/config.toml on Linux)
    /// 3. User config file (~/.config/hls-player/config.toml on Linux)
    /// 4. Environment variables (HLS_PLAYER_* prefix)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(system_path) = Self::system_config_path() {
            if system_path.exists() {
                config = Self::from_file(&system_path)?;
            }
        }

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config = Self::from_file(&user_path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a single TOML file, applying environment
    /// overrides and validation on top of it
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the given path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).config_err("Failed to create config directory")?;
        }

        let toml = toml::to_string_pretty(self).config_err("Failed to serialize config")?;

        std::fs::write(path, toml).config_err("Failed to write config file")?;

        Ok(())
    }

    /// Parse a TOML file; missing keys fall back to their defaults
    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).config_err("Failed to read config file")?;
        toml::from_str(&contents).config_err("Failed to parse config file")
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("HLS_PLAYER_INITIAL_VOLUME") {
            self.audio.initial_level = level
                .parse()
                .map_err(|_| PlayerError::Config("Invalid HLS_PLAYER_INITIAL_VOLUME".to_string()))?;
        }

        if let Ok(delay) = std::env::var("HLS_PLAYER_HIDE_DELAY_MS") {
            self.controls.hide_delay_ms = delay
                .parse()
                .map_err(|_| PlayerError::Config("Invalid HLS_PLAYER_HIDE_DELAY_MS".to_string()))?;
        }

        if let Ok(autoplay) = std::env::var("HLS_PLAYER_AUTOPLAY") {
            self.playback.autoplay = autoplay
                .parse()
                .map_err(|_| PlayerError::Config("Invalid HLS_PLAYER_AUTOPLAY".to_string()))?;
        }

        if let Ok(log_level) = std::env::var("HLS_PLAYER_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.audio.initial_level > 100 {
            return Err(PlayerError::Config("Initial volume must be between 0 and 100".to_string()));
        }

        if self.controls.hide_delay_ms == 0 {
            return Err(PlayerError::Config("Controls hide delay must be non-zero".to_string()));
        }

        if self.playback.native_mime_type.trim().is_empty() {
            return Err(PlayerError::Config("Native MIME type must not be empty".to_string()));
        }

        let engine = &self.engine;
        if engine.start_level < -1 {
            return Err(PlayerError::Config(
                "Engine start level must be -1 or a level index".to_string(),
            ));
        }
        for (name, factor) in [
            ("abr_bandwidth_factor", engine.abr_bandwidth_factor),
            ("abr_bandwidth_up_factor", engine.abr_bandwidth_up_factor),
        ] {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(PlayerError::Config(format!("{} must be in (0, 1]", name)));
            }
        }
        if engine.abr_ewma_fast_live <= 0.0 || engine.abr_ewma_slow_live <= 0.0 {
            return Err(PlayerError::Config("EWMA half-lives must be positive".to_string()));
        }
        if engine.max_starvation_delay < 0.0 {
            return Err(PlayerError::Config(
                "Max starvation delay must not be negative".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(PlayerError::Config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level,
                valid_log_levels
            )));
        }

        Ok(())
    }

    /// Get system config file path
    fn system_config_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        return Some(PathBuf::from("/etc/hls-player/config.toml"));

        #[cfg(target_os = "windows")]
        return std::env::var("PROGRAMDATA").ok()
            .map(|p| PathBuf::from(p).join("hls-player").join("config.toml"));

        #[cfg(target_os = "macos")]
        return Some(PathBuf::from("/Library/Application Support/hls-player/config.toml"));

        #[allow(unreachable_code)]
        None
    }

    /// Get user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("hls-player").join("config.toml"))
    }
}
