use studioos_core::error::CoreError;

/// Errors from local storage and remote sync.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying storage could not be read or written.
    #[error("Storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the value would exceed the configured storage quota.
    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, {available} available")]
    QuotaExceeded {
        key: String,
        needed: u64,
        available: u64,
    },

    /// The in-memory value could not be serialized.
    #[error("Serialization failed for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The remote module endpoint failed or was unreachable.
    #[error("Remote sync failed: {0}")]
    Remote(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote(err.to_string())
    }
}
