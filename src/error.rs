use thiserror::Error;

/// Failure of the durable preference store. Never surfaces to callers of the
/// recorder; the engine logs it and carries on with in-memory state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("preference store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("preference store document is malformed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("value for key `{0}` is not valid UTF-8")]
    Encoding(String),

    #[error("preference store is unavailable")]
    Unavailable,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
