//! Error types for migration operations.

use thiserror::Error;

/// Migration-specific errors.
///
/// Every variant is fatal for the run: the migrator stops at the first error
/// and does not continue with the remaining repositories.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// An external command exited with a non-zero status.
    #[error("Command `{command}` failed with {status}")]
    CommandFailed {
        /// The command line as it was echoed to the user.
        command: String,
        /// Exit status description (`exit status: 128`, `signal: 9`, ...).
        status: String,
    },

    /// An external command could not be launched at all.
    #[error("Failed to launch `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to authenticate with a hosting platform.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested API resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// API request failed.
    #[error("API request failed: {0}")]
    ApiError(String),

    /// The API answered with a body of an unexpected shape.
    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    /// Network error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrationError>;
