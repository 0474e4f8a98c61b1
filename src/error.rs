//! Error types for the netstore library.

use thiserror::Error;

/// Main error type for netstore operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// HTTP request failed with status code.
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Network request error.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Local file I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Request did not complete within the configured timeout.
    #[error("HTTP request timed out")]
    Timeout,

    /// Path could not be normalized into a location.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Entry name is empty or contains a path separator.
    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    /// Invalid or unexpected response from server.
    #[error("Invalid response from server")]
    InvalidResponse,

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The browser actor has shut down.
    #[error("Browser actor stopped")]
    ActorStopped,

    /// Custom error message.
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for netstore operations.
pub type Result<T> = std::result::Result<T, StoreError>;
