//! # Core Fetch Module
//!
//! Remote catalog access for the reader core: the typed catalog client, the
//! chapter-body sanitizer, and the fetch coordinators that dedupe and cache
//! lookups.
//!
//! ## Overview
//!
//! - [`CatalogClient`] speaks the catalog's envelope protocol over the
//!   injected [`CatalogTransport`](bridge_traits::http::CatalogTransport).
//! - [`FetchCoordinator`] wraps one remote resource and guarantees
//!   single-flight per key, cache-on-repeat, stale-drop ordering, and
//!   reset-on-error.
//! - [`strip_markup`] turns served chapter markup into display-ready text.
//!
//! ## Usage
//!
//! ```ignore
//! use core_fetch::{CatalogClient, DetailFetch, FetchCoordinator};
//!
//! let client = CatalogClient::new(transport);
//! let detail = FetchCoordinator::new("detail", DetailFetch::new(client));
//! let book = detail.request(book_id).await?;
//! ```

pub mod catalog;
pub mod coordinator;
pub mod error;
pub mod sanitize;

pub use catalog::{
    BookDetail, CatalogClient, ContentFetch, DetailFetch, SearchFetch, CHAPTER_PATH, DETAIL_PATH,
    SEARCH_PATH,
};
pub use coordinator::{FetchCoordinator, FetchKey, RemoteFetch};
pub use error::{FetchError, Result};
pub use sanitize::{glyph_count, strip_markup};
