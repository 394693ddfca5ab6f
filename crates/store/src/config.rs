use std::path::PathBuf;
use std::time::Duration;

use studioos_core::storage_keys::DEFAULT_NAMESPACE;

use crate::error::StoreError;

/// Default quiet period before a pending change is pushed remotely.
pub const DEFAULT_SYNC_DEBOUNCE_MS: u64 = 800;

/// Local store configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding one file per storage key.
    pub data_dir: PathBuf,
    /// Prefix for every storage key.
    pub namespace: String,
    /// Total byte cap for the data directory. `None` means unlimited.
    pub quota_bytes: Option<u64>,
    /// Quiet period after the last change before a remote upsert.
    pub sync_debounce: Duration,
    /// Base URL of the module endpoints. `None` disables remote sync.
    pub sync_url: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".studioos"),
            namespace: DEFAULT_NAMESPACE.to_string(),
            quota_bytes: None,
            sync_debounce: Duration::from_millis(DEFAULT_SYNC_DEBOUNCE_MS),
            sync_url: None,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default      |
    /// |-----------------------------|--------------|
    /// | `STUDIOOS_DATA_DIR`         | `.studioos`  |
    /// | `STUDIOOS_NAMESPACE`        | `studioos`   |
    /// | `STUDIOOS_QUOTA_BYTES`      | unlimited    |
    /// | `STUDIOOS_SYNC_DEBOUNCE_MS` | `800`        |
    /// | `STUDIOOS_SYNC_URL`         | sync off     |
    pub fn from_env() -> Result<Self, StoreError> {
        let defaults = Self::default();

        let data_dir = std::env::var("STUDIOOS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let namespace = std::env::var("STUDIOOS_NAMESPACE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.namespace);

        let quota_bytes = match std::env::var("STUDIOOS_QUOTA_BYTES") {
            Ok(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                StoreError::Config(format!("STUDIOOS_QUOTA_BYTES must be a valid u64, got '{raw}'"))
            })?),
            Err(_) => None,
        };

        let sync_debounce = match std::env::var("STUDIOOS_SYNC_DEBOUNCE_MS") {
            Ok(raw) => Duration::from_millis(raw.trim().parse::<u64>().map_err(|_| {
                StoreError::Config(format!(
                    "STUDIOOS_SYNC_DEBOUNCE_MS must be a valid u64, got '{raw}'"
                ))
            })?),
            Err(_) => defaults.sync_debounce,
        };

        let sync_url = std::env::var("STUDIOOS_SYNC_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            data_dir,
            namespace,
            quota_bytes,
            sync_debounce,
            sync_url,
        })
    }
}
