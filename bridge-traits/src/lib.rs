//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the reader core and
//! platform-specific implementations. Each trait represents a capability that
//! the core requires but that must be implemented differently per platform
//! (desktop, iOS, Android, web).
//!
//! ## Traits
//!
//! - [`KeyValueStore`](storage::KeyValueStore) - Durable string-keyed
//!   substrate backing the library, progress, settings, and history stores
//! - [`CatalogTransport`](http::CatalogTransport) - Async request client for
//!   the remote catalog API
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ In Progress |
//! | iOS      | TBD                 | 📋 Planned |
//! | Android  | TBD                 | 📋 Planned |
//! | Web      | TBD                 | 📋 Planned |
//!
//! ## Fail-Fast Strategy
//!
//! The core should fail fast with descriptive errors when a required
//! capability is missing:
//!
//! ```ignore
//! use core_runtime::error::Error;
//!
//! pub fn new(config: CoreConfig) -> Result<Self> {
//!     let transport = config.transport
//!         .ok_or_else(|| Error::CapabilityMissing {
//!             capability: "CatalogTransport".to_string(),
//!             message: "No transport implementation provided. \
//!                      Desktop: ensure the 'desktop-shims' feature is enabled. \
//!                      Mobile: inject a platform-native adapter.".to_string()
//!         })?;
//!     // ...
//! }
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type for
//! consistent error handling. Platform implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Provide actionable error messages
//! - Include error context (e.g., file paths, HTTP status)
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks. Implementations must ensure thread safety.

pub mod error;
pub mod http;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{CatalogTransport, HttpMethod, RetryPolicy, TransportResponse};
pub use storage::KeyValueStore;
