//! # Core Store Module
//!
//! Domain models and the four durable stores of the reader core:
//! - [`LibraryStore`] - the personal shelf
//! - [`ProgressStore`] - per-book reading positions
//! - [`SettingsStore`] - the singleton display settings record
//! - [`HistoryStore`] - recent search keywords
//!
//! ## Overview
//!
//! Every store is a synchronous read-modify-write over one JSON entry in the
//! injected [`KeyValueStore`](bridge_traits::storage::KeyValueStore)
//! substrate. Reads never fail: a missing or malformed entry decodes to the
//! empty/default value with a `warn!`. Writes propagate [`StoreError`].

pub mod error;
pub mod history;
pub mod library;
pub mod models;
pub mod progress;
pub mod settings;

pub use error::{Result, StoreError};
pub use history::{HistoryStore, DEFAULT_HISTORY_LIMIT};
pub use library::LibraryStore;
pub use models::{
    Book, BookId, BookPatch, BookStatus, ChapterContent, ChapterRef, DisplaySettings,
    DisplaySettingsPatch, PageMode, ReadingProgress, Theme,
};
pub use progress::ProgressStore;
pub use settings::SettingsStore;
