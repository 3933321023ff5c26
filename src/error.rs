//! Error types for HealthAI
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for HealthAI operations
///
/// Covers configuration loading, input validation, provider interactions,
/// history storage, and the chat streaming loop.
#[derive(Error, Debug)]
pub enum HealthaiError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, malformed responses, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// User input rejected before any request was made
    ///
    /// The message is shown to the user verbatim.
    #[error("{0}")]
    Validation(String),

    /// A panel request failed at the provider; carries the user-facing message
    #[error("{0}")]
    PanelFailed(String),

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Authentication errors (e.g., 401 Unauthorized)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Analysis history storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Document fetch errors for the policy endpoint
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The in-flight request was cancelled by the user
    #[error("Request cancelled")]
    Cancelled,

    /// A request is already in progress for this session
    #[error("A request is already in progress")]
    Busy,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for HealthAI operations
///
/// Uses `anyhow::Error` so call sites can attach context; typed
/// `HealthaiError` values are recovered with `downcast_ref` where the
/// variant matters (HTTP status mapping, cancellation).
pub type Result<T> = anyhow::Result<T>;
