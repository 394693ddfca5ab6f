//! A typed in-memory value mirrored to one backend key.
//!
//! The binding is the single source of truth for its value: reads never
//! touch the backend, and every mutation is persisted synchronously right
//! after the in-memory update. A failed write does not roll back memory.
//! It is logged and kept as a one-shot [`StorageWarning`] so the caller can
//! tell the user once, instead of on every keystroke.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::backend::KvBackend;
use crate::error::StoreError;

/// A persistence failure the user has not been told about yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageWarning {
    pub key: String,
    pub message: String,
}

pub struct StoreBinding<T> {
    backend: Arc<dyn KvBackend>,
    key: String,
    value: T,
    default: T,
    /// Set on the first failed write, cleared by a successful one.
    warning: Option<StorageWarning>,
    /// Whether `warning` has already been handed out.
    warning_taken: bool,
}

impl<T> std::fmt::Debug for StoreBinding<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreBinding")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("warning", &self.warning)
            .finish()
    }
}

impl<T> StoreBinding<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Load `key` from the backend, or start from `default`.
    ///
    /// Never fails: a missing key, an unreadable backend, or a stored value
    /// that does not parse as `T` all yield `default`.
    pub fn hydrate(backend: Arc<dyn KvBackend>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let value = read_or_default(backend.as_ref(), &key, &default);
        Self {
            backend,
            key,
            value,
            default,
            warning: None,
            warning_taken: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and persist it.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.persist();
    }

    /// Mutate the value in place and persist it.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let out = f(&mut self.value);
        self.persist();
        out
    }

    /// Write the current value, returning the backend error instead of
    /// recording a warning.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        let result = self.write();
        if result.is_ok() {
            self.clear_warning();
        }
        result
    }

    /// Re-read the backend, discarding the in-memory value.
    pub fn reload(&mut self) {
        self.value = read_or_default(self.backend.as_ref(), &self.key, &self.default);
    }

    /// The pending persistence warning, returned at most once per failure
    /// streak.
    pub fn take_warning(&mut self) -> Option<StorageWarning> {
        if self.warning_taken {
            return None;
        }
        let warning = self.warning.clone()?;
        self.warning_taken = true;
        Some(warning)
    }

    /// Whether the last write failed.
    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }

    fn write(&self) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&self.value).map_err(|source| StoreError::Serialize {
            key: self.key.clone(),
            source,
        })?;
        self.backend.set(&self.key, &raw)
    }

    fn persist(&mut self) {
        match self.write() {
            Ok(()) => self.clear_warning(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to persist value");
                if self.warning.is_none() {
                    self.warning = Some(StorageWarning {
                        key: self.key.clone(),
                        message: e.to_string(),
                    });
                    self.warning_taken = false;
                }
            }
        }
    }

    fn clear_warning(&mut self) {
        if self.warning.take().is_some() {
            tracing::info!(key = %self.key, "Persistence recovered");
        }
        self.warning_taken = false;
    }
}

fn read_or_default<T>(backend: &dyn KvBackend, key: &str, default: &T) -> T
where
    T: DeserializeOwned + Clone,
{
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return default.clone(),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Failed to read stored value, using default");
            return default.clone();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Stored value is not valid, using default");
            default.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Deserialize;
    use serde_json::{json, Value};

    use super::*;
    use crate::backend::MemoryBackend;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Board {
        title: String,
        cards: Vec<String>,
        meta: BTreeMap<String, Value>,
    }

    fn empty_board() -> Board {
        Board {
            title: "untitled".into(),
            cards: vec![],
            meta: BTreeMap::new(),
        }
    }

    // -- hydrate -------------------------------------------------------------

    #[test]
    fn missing_key_hydrates_default() {
        let backend: Arc<dyn KvBackend> = Arc::new(MemoryBackend::new());
        let binding = StoreBinding::hydrate(backend, "studioos.board", empty_board());
        assert_eq!(binding.get(), &empty_board());
    }

    #[test]
    fn corrupt_value_hydrates_default() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set("studioos.board", "{not json").unwrap();
        let binding = StoreBinding::hydrate(backend, "studioos.board", empty_board());
        assert_eq!(binding.get(), &empty_board());
    }

    #[test]
    fn wrong_shape_hydrates_default() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set("studioos.board", "[1, 2, 3]").unwrap();
        let binding = StoreBinding::hydrate(backend, "studioos.board", empty_board());
        assert_eq!(binding.get(), &empty_board());
    }

    // -- persistence ---------------------------------------------------------

    #[test]
    fn written_value_survives_rehydrate_including_empty_containers() {
        let backend = Arc::new(MemoryBackend::new());
        let value = Board {
            title: "Launch".into(),
            cards: vec![],
            meta: BTreeMap::from([
                ("empty_list".to_string(), json!([])),
                ("empty_map".to_string(), json!({})),
                ("nested".to_string(), json!({"a": [1, {"b": null}]})),
            ]),
        };

        let mut binding = StoreBinding::hydrate(backend.clone(), "k", empty_board());
        binding.set(value.clone());

        let reread = StoreBinding::hydrate(backend, "k", empty_board());
        assert_eq!(reread.get(), &value);
    }

    #[test]
    fn update_persists_and_returns_closure_result() {
        let backend = Arc::new(MemoryBackend::new());
        let mut binding = StoreBinding::hydrate(backend.clone(), "k", empty_board());

        let len = binding.update(|b| {
            b.cards.push("first".into());
            b.cards.len()
        });
        assert_eq!(len, 1);

        let reread = StoreBinding::hydrate(backend, "k", empty_board());
        assert_eq!(reread.get().cards, vec!["first".to_string()]);
    }

    // -- warnings ------------------------------------------------------------

    #[test]
    fn quota_failure_keeps_memory_and_warns_once() {
        let backend = Arc::new(MemoryBackend::with_quota(40));
        let mut binding = StoreBinding::hydrate(backend.clone(), "k", empty_board());

        binding.update(|b| b.title = "x".repeat(100));
        assert_eq!(binding.get().title.len(), 100);
        assert!(binding.is_degraded());

        let warning = binding.take_warning().expect("warning after failed write");
        assert_eq!(warning.key, "k");
        assert!(warning.message.contains("quota"));

        // Further failures in the same streak do not warn again.
        binding.update(|b| b.title.push('y'));
        assert_eq!(binding.take_warning(), None);

        // Nothing was persisted.
        assert_eq!(backend.get("k").unwrap(), None);
    }

    #[test]
    fn successful_write_resets_warning() {
        let backend = Arc::new(MemoryBackend::with_quota(60));
        let mut binding = StoreBinding::hydrate(backend, "k", empty_board());

        binding.update(|b| b.title = "x".repeat(100));
        assert!(binding.take_warning().is_some());

        binding.update(|b| b.title = "ok".into());
        assert!(!binding.is_degraded());

        binding.update(|b| b.title = "z".repeat(100));
        assert!(binding.take_warning().is_some());
    }

    #[test]
    fn flush_surfaces_error() {
        let backend = Arc::new(MemoryBackend::with_quota(10));
        let mut binding = StoreBinding::hydrate(backend, "k", empty_board());
        assert!(binding.flush().is_err());
    }

    #[test]
    fn reload_picks_up_external_writes() {
        let backend = Arc::new(MemoryBackend::new());
        let mut binding = StoreBinding::hydrate(backend.clone(), "k", empty_board());
        backend
            .set("k", r#"{"title":"outside","cards":["a"],"meta":{}}"#)
            .unwrap();
        binding.reload();
        assert_eq!(binding.get().title, "outside");
    }
}
