//! Error types for hls-player
//!
//! This module defines custom error types used throughout the crate.
//! We use thiserror for the library error enum and anyhow for
//! binary-level error handling.

use thiserror::Error;

/// Main error type for hls-player
#[derive(Error, Debug)]
pub enum PlayerError {
    /// Neither the adaptive engine nor the sink can play the source
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Adaptive streaming engine errors
    #[error("Engine error: {0}")]
    Engine(String),

    /// Media sink errors
    #[error("Sink error: {0}")]
    Sink(String),

    /// Host fullscreen errors
    #[error("Fullscreen error: {0}")]
    Fullscreen(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error for unexpected situations
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlayerError {
    /// Create a sink error from string
    pub fn sink_error<S: Into<String>>(msg: S) -> Self {
        PlayerError::Sink(msg.into())
    }

    /// Create an engine error from string
    pub fn engine_error<S: Into<String>>(msg: S) -> Self {
        PlayerError::Engine(msg.into())
    }
}

/// Convenience type alias for Results in hls-player
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Extension trait for converting other errors to PlayerError
pub trait IntoPlayerError<T> {
    /// Convert this error into a `PlayerError::Config` with the given context
    fn config_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoPlayerError<T> for std::result::Result<T, E> {
    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlayerError::Config(format!("{}: {}", context, e)))
    }
}

/// Helper macro for creating internal errors with file and line information
#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::utils::error::PlayerError::Internal(
            format!("{} at {}:{}", $msg, file!(), line!())
        )
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::utils::error::PlayerError::Internal(
            format!("{} at {}:{}", format!($fmt, $($arg)*), file!(), line!())
        )
    };
}
