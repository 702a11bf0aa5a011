//! File-Backed Key-Value Store
//!
//! Stores each key as one JSON document file under a root directory. Writes
//! go through a temporary file and an atomic rename so a crash mid-write
//! never leaves a truncated document behind.

use bridge_traits::error::{BridgeError, Result};
use bridge_traits::storage::KeyValueStore;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-per-key `KeyValueStore` implementation
///
/// Keys map to `<root>/<sanitized-key>.json`. Key sanitization replaces any
/// character outside `[A-Za-z0-9._-]` with `_`, which is lossy but the store
/// keys used by the core are plain ASCII identifiers.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Create a store under the user data directory, namespaced by `app_name`
    pub fn in_user_data(app_name: &str) -> Result<Self> {
        let base = dirs::data_dir().ok_or_else(|| {
            BridgeError::NotAvailable("no user data directory on this platform".to_string())
        })?;
        Self::new(base.join(app_name))
    }

    /// Root directory this store writes under
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{}.json", sanitized))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(key = key, bytes = value.len(), "Persisted store entry");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn temp_store() -> (PathBuf, JsonFileStore) {
        let dir = std::env::temp_dir().join(format!(
            "json-file-store-test-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::SeqCst)
        ));
        let store = JsonFileStore::new(&dir).unwrap();
        (dir, store)
    }

    #[test]
    fn test_round_trip() {
        let (dir, store) = temp_store();

        assert_eq!(store.get("ebook_bookshelf").unwrap(), None);
        store.set("ebook_bookshelf", r#"[{"id":"x"}]"#).unwrap();
        assert_eq!(
            store.get("ebook_bookshelf").unwrap().as_deref(),
            Some(r#"[{"id":"x"}]"#)
        );

        store.remove("ebook_bookshelf").unwrap();
        assert_eq!(store.get("ebook_bookshelf").unwrap(), None);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_key_sanitization() {
        let (dir, store) = temp_store();

        store.set("weird/key name", "v").unwrap();
        assert_eq!(store.get("weird/key name").unwrap().as_deref(), Some("v"));
        assert!(dir.join("weird_key_name.json").exists());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let (dir, store) = temp_store();

        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));

        let _ = fs::remove_dir_all(dir);
    }
}
