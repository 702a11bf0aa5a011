//! Search history persistence.
//!
//! One JSON string array under a single substrate key, most recent first,
//! deduplicated, capped.

use crate::error::Result;
use bridge_traits::storage::KeyValueStore;
use std::sync::Arc;
use tracing::warn;

/// Substrate key holding the history array.
pub const HISTORY_KEY: &str = "ebook_search_history";

/// Default cap on retained keywords.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

pub struct HistoryStore {
    kv: Arc<dyn KeyValueStore>,
    limit: usize,
}

impl HistoryStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_limit(kv, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(kv: Arc<dyn KeyValueStore>, limit: usize) -> Self {
        Self { kv, limit }
    }

    /// Keywords, most recent first.
    pub fn list(&self) -> Vec<String> {
        self.read_list()
    }

    /// Record a keyword. The keyword is trimmed; a blank keyword is skipped.
    /// Re-adding an existing keyword moves it to the front. The list is
    /// capped at the configured limit. Returns the updated list.
    pub fn add(&self, keyword: &str) -> Result<Vec<String>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(self.read_list());
        }

        let mut list = self.read_list();
        list.retain(|k| k != keyword);
        list.insert(0, keyword.to_string());
        list.truncate(self.limit);

        let raw = serde_json::to_string(&list)?;
        self.kv.set(HISTORY_KEY, &raw)?;
        Ok(list)
    }

    pub fn clear(&self) -> Result<()> {
        self.kv.remove(HISTORY_KEY)?;
        Ok(())
    }

    fn read_list(&self) -> Vec<String> {
        let raw = match self.kv.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read search history, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "Malformed history record, treating as empty");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::MemoryKeyValueStore;

    fn store() -> HistoryStore {
        HistoryStore::new(Arc::new(MemoryKeyValueStore::new()))
    }

    #[test]
    fn test_add_most_recent_first() {
        let store = store();
        store.add("first").unwrap();
        let list = store.add("second").unwrap();
        assert_eq!(list, vec!["second", "first"]);
    }

    #[test]
    fn test_readd_moves_to_front_without_duplicate() {
        let store = store();
        store.add("alpha").unwrap();
        store.add("beta").unwrap();
        let list = store.add("alpha").unwrap();
        assert_eq!(list, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_blank_keyword_skipped() {
        let store = store();
        store.add("kept").unwrap();
        let list = store.add("   ").unwrap();
        assert_eq!(list, vec!["kept"]);
    }

    #[test]
    fn test_keyword_trimmed() {
        let store = store();
        let list = store.add("  padded  ").unwrap();
        assert_eq!(list, vec!["padded"]);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let store = HistoryStore::with_limit(Arc::new(MemoryKeyValueStore::new()), 3);
        for kw in ["a", "b", "c", "d"] {
            store.add(kw).unwrap();
        }
        assert_eq!(store.list(), vec!["d", "c", "b"]);
    }

    #[test]
    fn test_clear() {
        let store = store();
        store.add("anything").unwrap();
        store.clear().unwrap();
        assert!(store.list().is_empty());
    }
}
