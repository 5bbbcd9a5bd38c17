//! Utility module for hls-player
//!
//! This module provides common utilities used throughout the crate:
//! - Error handling with custom error types
//! - Configuration management
//! - Display helpers for the controls overlay

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::{AudioConfig, Config, ControlsConfig, EngineConfig, GeneralConfig, PlaybackConfig};
pub use error::{PlayerError, Result};

/// Format a position in seconds for display
///
/// Returns "HH:MM:SS", or "MM:SS" for positions under an hour. Negative and
/// non-finite values render as zero.
pub fn format_duration(seconds: f64) -> String {
    let total_secs = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Clamp a value between min and max
///
/// Unlike `f64::clamp` this never panics when `max < min`; `min` wins.
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value > max {
        if max < min { min } else { max }
    } else if value < min {
        min
    } else {
        value
    }
}
