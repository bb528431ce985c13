//! Error types for settings resolution and token storage.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration and storage operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A token was empty or whitespace-only.
    #[error("token must not be empty")]
    EmptyToken,
    /// The API base URL could not be parsed or used.
    #[error("invalid API base URL '{value}': {reason}")]
    InvalidBaseUrl {
        /// Offending value supplied by the caller.
        value: String,
        /// Human-readable reason for the rejection.
        reason: String,
    },
    /// The storage file exists but is not a JSON object.
    #[error("storage file {path} is not a valid key/value document")]
    StorageFormat {
        /// Location of the storage file.
        path: PathBuf,
        /// Parse failure, when the document was not JSON at all.
        #[source]
        source: Option<serde_json::Error>,
    },
    /// Encoding the storage document failed.
    #[error("failed to encode storage document")]
    StorageEncode {
        /// Source serialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// File system operation failed.
    #[error("filesystem operation '{operation}' failed for {path}")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path the operation targeted.
        path: PathBuf,
        /// Source IO error.
        #[source]
        source: io::Error,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
