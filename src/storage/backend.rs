//! Backend Module
//!
//! The ambient key-value medium the store is built on. Backends are
//! synchronous, may be size-limited, and report every failure as a
//! [`StorageError`] for the store to absorb.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, StorageError};

// == Backend Trait ==
/// Synchronous string key-value store.
pub trait KeyValueBackend: Send + Sync {
    /// Returns the raw value for `key`, or `Ok(None)` if absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Inserts or replaces a value.
    fn set_item(&mut self, key: &str, value: String) -> Result<()>;

    /// Removes a value. Removing an absent key succeeds.
    fn remove_item(&mut self, key: &str) -> Result<()>;

    /// Lists every key currently present, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for Box<B> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

/// Type-erased backend used where the concrete medium is picked at runtime.
pub type DynBackend = Box<dyn KeyValueBackend>;

// == Quota Accounting ==
/// Bytes charged for one entry: key plus value, as browsers do.
fn entry_cost(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

fn used_bytes(items: &HashMap<String, String>) -> usize {
    items.iter().map(|(k, v)| entry_cost(k, v)).sum()
}

/// Fails with `QuotaExceeded` if replacing `key` with `value` would pass `quota`.
fn check_quota(
    items: &HashMap<String, String>,
    quota: Option<usize>,
    key: &str,
    value: &str,
) -> Result<()> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let current = used_bytes(items);
    let replaced = items.get(key).map(|old| entry_cost(key, old)).unwrap_or(0);
    let available = quota.saturating_sub(current - replaced);
    let needed = entry_cost(key, value);
    if needed > available {
        return Err(StorageError::QuotaExceeded { needed, available });
    }
    Ok(())
}

// == Memory Backend ==
/// In-memory backend with an optional byte quota.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    items: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryBackend {
    /// Creates an unlimited in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that rejects writes once `quota` bytes are used.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: HashMap::new(),
            quota: Some(quota),
        }
    }

    /// Bytes currently charged against the quota.
    pub fn used_bytes(&self) -> usize {
        used_bytes(&self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        check_quota(&self.items, self.quota, key, &value)?;
        self.items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.items.keys().cloned().collect())
    }
}

// == File Backend ==
/// Backend persisting all keys as one JSON object on disk.
///
/// Every mutation rewrites the file through a temporary sibling and a rename,
/// so a crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    items: HashMap<String, String>,
    quota: Option<usize>,
}

impl FileBackend {
    /// Opens the file at `path`, creating an empty store if it doesn't exist.
    pub fn open(path: impl Into<PathBuf>, quota: Option<usize>) -> Result<Self> {
        let path = path.into();
        let items = if path.exists() {
            let text = fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&text).map_err(|e| {
                    StorageError::CorruptedData(format!("{}: {}", path.display(), e))
                })?
            }
        } else {
            HashMap::new()
        };

        debug!(path = %path.display(), entries = items.len(), "Opened file backend");
        Ok(Self { path, items, quota })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let text = serde_json::to_string(&self.items)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(text.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueBackend for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        check_quota(&self.items, self.quota, key, &value)?;
        let previous = self.items.insert(key.to_string(), value);
        if let Err(e) = self.persist() {
            // Keep memory and disk in agreement
            match previous {
                Some(old) => self.items.insert(key.to_string(), old),
                None => self.items.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        let Some(previous) = self.items.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.persist() {
            self.items.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.items.keys().cloned().collect())
    }
}
