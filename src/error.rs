//! # Error Types
//!
//! Custom error types for WLAN Tracker using `thiserror`.

use thiserror::Error;

/// Errors reported by the scan payload codec
///
/// The codec never retries or logs; callers decide what to do with these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Payload is shorter than its record count implies
    #[error("truncated input: expected {expected} bytes, got {actual}")]
    TruncatedInput { expected: usize, actual: usize },

    /// Payload carries bytes past the last declared record
    #[error("trailing data: expected {expected} bytes, got {actual}")]
    TrailingData { expected: usize, actual: usize },

    /// Input field or record count does not fit its wire width
    #[error("precondition violation: {0}")]
    PreconditionViolation(String),
}

/// Main error type for WLAN Tracker
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Scan payload codec errors
    #[error("payload codec error: {0}")]
    Codec(#[from] CodecError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Hex payload errors
    #[error("hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Serial port errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// Payload does not fit the uplink's size budget
    #[error("Payload of {size} bytes exceeds the uplink limit of {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// None of the candidate serial devices could be opened
    #[error("No radio modem found (tried: {0})")]
    SerialPortNotFound(String),

    /// WLAN scan errors
    #[error("Scan error: {0}")]
    Scan(String),
}

/// Result type alias for WLAN Tracker
pub type Result<T> = std::result::Result<T, TrackerError>;
