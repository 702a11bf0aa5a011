//! Per-book reading progress persistence.
//!
//! One JSON object under a single substrate key, mapping book id to its
//! [`ReadingProgress`] record. Saving merges by book id; a record disappears
//! only through an explicit reset.

use crate::error::Result;
use crate::models::{BookId, ReadingProgress};
use bridge_traits::storage::KeyValueStore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Substrate key holding the progress map.
pub const PROGRESS_KEY: &str = "ebook_reading_progress";

pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn get(&self, book_id: &BookId) -> Option<ReadingProgress> {
        self.read_map().remove(book_id.as_str())
    }

    pub fn all(&self) -> HashMap<BookId, ReadingProgress> {
        self.read_map()
            .into_iter()
            .map(|(id, progress)| (BookId::new(id), progress))
            .collect()
    }

    /// Insert or replace the record for `progress.book_id`. Other books'
    /// records are untouched.
    pub fn save(&self, progress: ReadingProgress) -> Result<()> {
        let mut map = self.read_map();
        map.insert(progress.book_id.as_str().to_string(), progress);
        self.write_map(&map)
    }

    /// Remove the record for one book only. Returns `false` when no record
    /// existed.
    pub fn reset_for(&self, book_id: &BookId) -> Result<bool> {
        let mut map = self.read_map();
        if map.remove(book_id.as_str()).is_none() {
            return Ok(false);
        }
        self.write_map(&map)?;
        Ok(true)
    }

    fn read_map(&self) -> HashMap<String, ReadingProgress> {
        let raw = match self.kv.get(PROGRESS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return HashMap::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read progress map, treating as empty");
                return HashMap::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "Malformed progress record, treating as empty");
                HashMap::new()
            }
        }
    }

    fn write_map(&self, map: &HashMap<String, ReadingProgress>) -> Result<()> {
        let raw = serde_json::to_string(map)?;
        self.kv.set(PROGRESS_KEY, &raw)?;
        Ok(())
    }
}
