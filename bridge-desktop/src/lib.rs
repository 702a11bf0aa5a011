//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides production-ready implementations of the bridge traits
//! using desktop-appropriate libraries:
//! - `CatalogTransport` using `reqwest`
//! - `KeyValueStore` using file-per-key JSON documents (`JsonFileStore`)
//! - `KeyValueStore` in-memory variant for tests and ephemeral hosts
//!   (`MemoryKeyValueStore`)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{JsonFileStore, ReqwestTransport};
//!
//! let store = JsonFileStore::new("/path/to/data")?;
//! let transport = ReqwestTransport::new("https://catalog.example.com");
//! // Use in core configuration
//! ```

mod http;
mod kv;
mod memory;

pub use http::ReqwestTransport;
pub use kv::JsonFileStore;
pub use memory::MemoryKeyValueStore;
