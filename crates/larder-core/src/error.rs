use thiserror::Error;

/// Top-level error type for Larder.
#[derive(Debug, Error)]
pub enum LarderError {
    /// Key-value store read or write failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A single recipe could not be resolved.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// A notification could not be scheduled, cancelled, or delivered.
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
