//! # Error Types
//!
//! Custom error types for the telemetry dashboard using `thiserror`.

use thiserror::Error;

/// Main error type for the telemetry dashboard
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Broker transport errors (connect, subscribe, link)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Payload on a known topic could not be parsed
    #[error("Malformed payload on {topic}: {payload:?}")]
    Payload { topic: String, payload: String },

    /// Operator input that is not a known command
    #[error("Unknown command: {0:?}")]
    Command(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the telemetry dashboard
pub type Result<T> = std::result::Result<T, DashboardError>;
