//! Personal library ("shelf") persistence.
//!
//! One JSON array under a single substrate key, most recently added first.
//! Reads degrade to an empty shelf when the substrate entry is missing or
//! malformed; writes propagate errors.

use crate::error::Result;
use crate::models::{Book, BookId, BookPatch};
use bridge_traits::storage::KeyValueStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// Substrate key holding the shelf array.
pub const SHELF_KEY: &str = "ebook_bookshelf";

pub struct LibraryStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LibraryStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// All shelf books, most recently added first.
    pub fn list(&self) -> Vec<Book> {
        self.read_shelf()
    }

    pub fn contains(&self, id: &BookId) -> bool {
        self.read_shelf().iter().any(|b| &b.id == id)
    }

    /// Add a book to the front of the shelf. Idempotent by id: adding a book
    /// that is already saved changes nothing and returns `false`.
    pub fn add(&self, mut book: Book) -> Result<bool> {
        let mut shelf = self.read_shelf();
        if shelf.iter().any(|b| b.id == book.id) {
            debug!(book_id = %book.id, "Book already on shelf");
            return Ok(false);
        }

        if book.added_at == 0 {
            book.added_at = Utc::now().timestamp();
        }
        shelf.insert(0, book);
        self.write_shelf(&shelf)?;
        Ok(true)
    }

    /// Remove a book by id. Returns `false` when the book was not saved.
    pub fn remove(&self, id: &BookId) -> Result<bool> {
        let mut shelf = self.read_shelf();
        let before = shelf.len();
        shelf.retain(|b| &b.id != id);
        if shelf.len() == before {
            return Ok(false);
        }
        self.write_shelf(&shelf)?;
        Ok(true)
    }

    /// Merge `patch` into the saved book with this id. A no-op (returning
    /// `false`) when the book is not on the shelf.
    pub fn update(&self, id: &BookId, patch: BookPatch) -> Result<bool> {
        if patch.is_empty() {
            return Ok(false);
        }

        let mut shelf = self.read_shelf();
        let Some(book) = shelf.iter_mut().find(|b| &b.id == id) else {
            return Ok(false);
        };

        patch.apply_to(book);
        self.write_shelf(&shelf)?;
        Ok(true)
    }

    fn read_shelf(&self) -> Vec<Book> {
        let raw = match self.kv.get(SHELF_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read shelf, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(shelf) => shelf,
            Err(e) => {
                warn!(error = %e, "Malformed shelf record, treating as empty");
                Vec::new()
            }
        }
    }

    fn write_shelf(&self, shelf: &[Book]) -> Result<()> {
        let raw = serde_json::to_string(shelf)?;
        self.kv.set(SHELF_KEY, &raw)?;
        Ok(())
    }
}
