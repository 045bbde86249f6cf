//! Origin-scoped string key-value stores.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::debug;
use tempfile::NamedTempFile;

use crate::errors::{LocalStoreError, Result};

/// Durable string key-value medium, scoped to one origin.
///
/// Operations are synchronous and single-shot; there is no compare-and-swap,
/// so concurrent read-modify-write cycles resolve as last writer wins.
pub trait KeyValueStore: Send + Sync {
    /// Stored value, or `None` when the key was never written.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(LocalStoreError::InvalidKey(key.to_string()))
    }
}

/// One file per key under the origin directory.
///
/// Each write goes to its own temporary sibling, is synced, and is renamed
/// into place, so a crash mid-write leaves the previous value intact and
/// overlapping writers end with the last rename winning.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Opens (creating if needed) the origin directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!("[LocalStore] Opened key-value store at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        #[cfg(unix)]
        {
            if let Ok(dir) = fs::File::open(&self.root) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }
}

/// In-process store with an optional byte quota across all values.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    items: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: RwLock::default(),
            quota: Some(quota),
        }
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let items = self.items.read().unwrap_or_else(|e| e.into_inner());
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let mut items = self.items.write().unwrap_or_else(|e| e.into_inner());
        if let Some(quota) = self.quota {
            let others: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let size = others + value.len();
            if size > quota {
                return Err(LocalStoreError::QuotaExceeded {
                    key: key.to_string(),
                    size,
                    quota,
                });
            }
        }
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn file_store_round_trips_and_reports_missing_keys() {
        let dir = tempdir().expect("tempdir");
        let store = FileKeyValueStore::open(dir.path().join("origin")).expect("open");

        assert_eq!(store.get_item("characters").unwrap(), None);
        store.set_item("characters", "[1,2]").unwrap();
        assert_eq!(store.get_item("characters").unwrap().as_deref(), Some("[1,2]"));

        store.set_item("characters", "[]").unwrap();
        assert_eq!(store.get_item("characters").unwrap().as_deref(), Some("[]"));
        let leftovers: Vec<_> = fs::read_dir(store.root())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("characters.json")]);
    }

    #[test]
    fn overlapping_file_writes_all_succeed_and_last_one_wins() {
        let dir = tempdir().expect("tempdir");
        let store = Arc::new(FileKeyValueStore::open(dir.path()).unwrap());
        let values: Vec<String> = (0..8)
            .map(|writer| format!("[{}]", writer.to_string().repeat(50_000)))
            .collect();

        for _ in 0..10 {
            let handles: Vec<_> = values
                .iter()
                .cloned()
                .map(|value| {
                    let store = Arc::clone(&store);
                    std::thread::spawn(move || store.set_item("k", &value))
                })
                .collect();
            for handle in handles {
                handle.join().expect("writer thread").unwrap();
            }

            let stored = store.get_item("k").unwrap().expect("written");
            assert!(values.contains(&stored));
        }
    }

    #[test]
    fn file_stores_in_different_origins_are_isolated() {
        let dir = tempdir().expect("tempdir");
        let a = FileKeyValueStore::open(dir.path().join("a")).unwrap();
        let b = FileKeyValueStore::open(dir.path().join("b")).unwrap();

        a.set_item("k", "from-a").unwrap();
        assert_eq!(b.get_item("k").unwrap(), None);
    }

    #[test]
    fn keys_that_escape_the_origin_are_rejected() {
        let store = MemoryKeyValueStore::new();
        for key in ["", "../etc", "a/b", ".hidden"] {
            assert!(
                matches!(store.get_item(key), Err(LocalStoreError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[test]
    fn memory_store_enforces_quota_across_keys() {
        let store = MemoryKeyValueStore::with_quota(10);
        store.set_item("a", "12345").unwrap();
        store.set_item("b", "12345").unwrap();

        let err = store.set_item("c", "1").unwrap_err();
        assert!(matches!(
            err,
            LocalStoreError::QuotaExceeded { size: 11, quota: 10, .. }
        ));

        // Overwriting an existing key only counts the new value.
        store.set_item("a", "123").unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("123"));
    }
}
