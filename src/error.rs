//! Error types for draft storage
//!
//! Validation failures are not errors; they are reported as
//! `ValidationResult` values. Everything here is recoverable: callers log
//! it and carry on as if no draft existed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DraftError {
    /// The backing store could not be read
    #[error("failed to read draft storage: {0}")]
    StorageRead(String),

    /// The backing store rejected a write
    #[error("failed to write draft '{key}': {message}")]
    StorageWrite { key: String, message: String },

    /// A stored draft was not valid JSON of the expected shape
    #[error("malformed draft under '{key}': {source}")]
    MalformedDraft {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize draft: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DraftError>;
