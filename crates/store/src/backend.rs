//! Durable key-value backends.
//!
//! A backend stores raw strings by key and knows nothing about JSON. Reads
//! and writes are synchronous; a write either lands completely or returns
//! an error (including [`StoreError::QuotaExceeded`]) that the caller must
//! surface.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::StoreError;

/// Synchronous string storage keyed by name.
pub trait KvBackend: Send + Sync {
    /// Read the raw value at `key`. `Ok(None)` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the raw value at `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// All stored keys, sorted.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Bytes a key/value pair counts against a quota.
fn entry_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}

// ---------------------------------------------------------------------------
// MemoryBackend
// ---------------------------------------------------------------------------

/// In-process backend, optionally capped at a byte quota.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<u64>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that rejects writes once keys plus values exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            entries: Mutex::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.lock();
        if let Some(quota) = self.quota_bytes {
            let used: u64 = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| entry_size(k, v))
                .sum();
            let needed = entry_size(key, value);
            let available = quota.saturating_sub(used);
            if needed > available {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    available,
                });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

// ---------------------------------------------------------------------------
// FileBackend
// ---------------------------------------------------------------------------

/// Extension of every value file.
const FILE_EXTENSION: &str = "json";

/// One file per key under a data directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
    quota_bytes: Option<u64>,
    write_lock: Mutex<()>,
}

impl FileBackend {
    /// Open (and create if needed) a data directory.
    pub fn open(root: impl Into<PathBuf>, quota_bytes: Option<u64>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            key: root.display().to_string(),
            source,
        })?;
        Ok(Self {
            root,
            quota_bytes,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{FILE_EXTENSION}", encode_key(key)))
    }

    /// Total bytes of stored values, excluding `skip`.
    fn used_bytes(&self, skip: &Path) -> Result<u64, StoreError> {
        let mut used = 0;
        for key in self.keys()? {
            let path = self.path_for(&key);
            if path == skip {
                continue;
            }
            let len = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            used += len + key.len() as u64;
        }
        Ok(used)
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let path = self.path_for(key);

        if let Some(quota) = self.quota_bytes {
            let used = self.used_bytes(&path)?;
            let needed = entry_size(key, value);
            let available = quota.saturating_sub(used);
            if needed > available {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    available,
                });
            }
        }

        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };
        let tmp = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(value.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::Io {
            key: self.root.display().to_string(),
            source,
        })?;
        let mut keys: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                    return None;
                }
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(decode_key)
            })
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// Make a key safe as a file name: `[A-Za-z0-9._-]` pass through, every
/// other byte becomes `%XX`.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Inverse of [`encode_key`]. `None` for names this backend did not write.
fn decode_key(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn memory_get_set_remove() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("k").unwrap(), None);
        backend.set("k", "v").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("v"));
        backend.remove("k").unwrap();
        backend.remove("k").unwrap();
        assert_eq!(backend.get("k").unwrap(), None);
    }

    #[test]
    fn memory_quota_rejects_oversized_write_and_keeps_old_value() {
        let backend = MemoryBackend::with_quota(10);
        backend.set("k", "12345").unwrap();
        let err = backend.set("k", "1234567890").unwrap_err();
        assert_matches!(err, StoreError::QuotaExceeded { needed: 11, available: 10, .. });
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("12345"));
    }

    #[test]
    fn memory_quota_counts_other_keys() {
        let backend = MemoryBackend::with_quota(12);
        backend.set("a", "12345").unwrap();
        backend.set("b", "12345").unwrap();
        assert!(backend.set("c", "1").is_err());
    }

    #[test]
    fn file_backend_round_trips_and_lists_keys() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path(), None).unwrap();

        backend.set("studioos.notes", "[]").unwrap();
        backend.set("weird/key name", "{}").unwrap();

        assert_eq!(backend.get("studioos.notes").unwrap().as_deref(), Some("[]"));
        assert_eq!(backend.get("weird/key name").unwrap().as_deref(), Some("{}"));
        assert_eq!(backend.get("missing").unwrap(), None);
        assert_eq!(
            backend.keys().unwrap(),
            vec!["studioos.notes".to_string(), "weird/key name".to_string()]
        );

        backend.remove("studioos.notes").unwrap();
        assert_eq!(backend.keys().unwrap(), vec!["weird/key name".to_string()]);
    }

    #[test]
    fn file_backend_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileBackend::open(dir.path(), None)
            .unwrap()
            .set("k", "value")
            .unwrap();
        let reopened = FileBackend::open(dir.path(), None).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn file_backend_enforces_quota() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path(), Some(20)).unwrap();
        backend.set("a", "0123456789").unwrap();
        assert_matches!(
            backend.set("b", "0123456789"),
            Err(StoreError::QuotaExceeded { .. })
        );
        // Rewriting the same key only counts the new size.
        backend.set("a", "0123456789abcdef").unwrap();
    }

    #[test]
    fn key_encoding_round_trips() {
        for key in ["plain", "a.b-c_d", "sp ace", "slash/ed", "ünï"] {
            assert_eq!(decode_key(&encode_key(key)).as_deref(), Some(key));
        }
        assert_eq!(decode_key("%zz"), None);
    }
}
