use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use crate::error::StoreError;

/// Durable key-value store the engine persists into.
/// An absent key is "no prior data", not an error.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

/// In-memory implementation.
///
/// Clones share the same map, so a "restarted" recorder can be built on the
/// data written by a previous one. Writes can be made to fail to exercise
/// best-effort persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Writes raw bytes, bypassing failure injection. Used to seed state.
    pub fn insert_raw(&self, key: &str, value: &[u8]) {
        self.values().insert(key.to_string(), value.to_vec());
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        self.values().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// File-backed implementation: one JSON object of `key → value` on disk.
///
/// The whole document is loaded on open and rewritten on every `set`
/// through a temp file + rename, so a crash leaves either the old or the new
/// document. Values must be UTF-8 (the engine only writes JSON).
#[derive(Debug)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFilePreferenceStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    ///
    /// A document that is not valid JSON is moved aside to `<path>.corrupt`
    /// and the store starts empty. Only I/O failures are returned.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self { path, values: BTreeMap::new() });
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Self { path, values: BTreeMap::new() });
        }

        let values = match serde_json::from_str(&content) {
            Ok(values) => values,
            Err(e) => {
                let aside = path.with_extension("corrupt");
                warn!(path = %path.display(), error = %e, "discarding malformed preference document");
                if let Err(e) = fs::rename(&path, &aside) {
                    warn!(path = %aside.display(), error = %e, "could not move malformed document aside");
                }
                BTreeMap::new()
            }
        };
        Ok(Self { path, values })
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.values.get(key).map(|v| v.as_bytes().to_vec()))
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let text = std::str::from_utf8(value)
            .map_err(|_| StoreError::Encoding(key.to_string()))?;
        self.values.insert(key.to_string(), text.to_string());
        self.save()
    }
}
