//! Durable Key-Value Substrate
//!
//! Platform-agnostic trait for the string-keyed persistence substrate that
//! backs the domain stores.

use crate::error::Result;

/// Synchronous key-value storage trait
///
/// Abstracts the durable substrate the domain stores are layered on:
/// - Desktop: file-per-key JSON documents under a data directory
/// - iOS/Android: UserDefaults / SharedPreferences
/// - Web: localStorage
///
/// The trait is deliberately synchronous: every store operation is a single
/// small read-modify-write and substrate backends are expected to complete
/// without suspending. Values are opaque strings; the stores layer JSON
/// encoding on top.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::KeyValueStore;
///
/// fn bump(store: &dyn KeyValueStore) -> Result<()> {
///     let current = store.get("counter")?.unwrap_or_default();
///     store.set("counter", &format!("{}.", current))?;
///     Ok(())
/// }
/// ```
pub trait KeyValueStore: Send + Sync {
    /// Retrieve the value stored under `key`
    ///
    /// Returns `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the entry under `key`
    ///
    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Check whether `key` has a stored value
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MapStore {
        entries: Mutex<HashMap<String, String>>,
    }

    impl KeyValueStore for MapStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[test]
    fn test_contains_default_impl() {
        let store = MapStore {
            entries: Mutex::new(HashMap::new()),
        };

        assert!(!store.contains("missing").unwrap());
        store.set("present", "1").unwrap();
        assert!(store.contains("present").unwrap());
        store.remove("present").unwrap();
        assert!(!store.contains("present").unwrap());
    }
}
