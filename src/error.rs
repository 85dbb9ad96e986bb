//! # Error Types
//!
//! Custom error types for SBUS2 telemetry using `thiserror`.

use thiserror::Error;

/// Main error type for SBUS2 telemetry
#[derive(Debug, Error)]
pub enum Sbus2Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port errors (open, write, flush)
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial devices could be opened
    #[error("No SBUS2 serial device found (tried: {0})")]
    SerialPortNotFound(String),
}

/// Result type alias for SBUS2 telemetry
pub type Result<T> = std::result::Result<T, Sbus2Error>;
