//! # Core Configuration Module
//!
//! Provides configuration management for the Reader Platform Core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds all necessary dependencies and settings for the core
//! library. It enforces fail-fast validation to ensure all required bridges
//! are provided before initialization.
//!
//! ## Required Dependencies
//!
//! - `KeyValueStore` - Required for shelf, progress, settings, and history
//!   persistence
//! - `CatalogTransport` - Required for remote catalog access
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults
//! (a JSON-file key-value store and a reqwest transport) are injected
//! automatically if not provided. The transport default still needs
//! `api_base_url` to be set.
//!
//! ## Usage
//!
//! ### Basic Configuration with Desktop Defaults
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://catalog.example.com")
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ### Configuration with Custom Bridges
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! // Note: Requires implementing KeyValueStore and CatalogTransport
//! let config = CoreConfig::builder()
//!     .key_value_store(Arc::new(MyKeyValueStore))
//!     .transport(Arc::new(MyTransport))
//!     .history_limit(50)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! The builder validates all required dependencies and provides actionable
//! error messages when capabilities are missing.

use crate::error::{Error, Result};
use bridge_traits::http::CatalogTransport;
use bridge_traits::storage::KeyValueStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Default cap on stored search-history entries.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_BUFFER: usize = 100;

/// Core configuration for the Reader Platform Core.
///
/// This struct holds all dependencies and settings required to initialize
/// the core library. Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Persistence substrate for shelf, progress, settings, and history
    pub key_value_store: Arc<dyn KeyValueStore>,

    /// Transport for remote catalog calls
    pub transport: Arc<dyn CatalogTransport>,

    /// Directory for the default JSON-file store (desktop-shims only)
    pub data_dir: Option<PathBuf>,

    /// Base URL of the catalog API (required by the default transport)
    pub api_base_url: Option<String>,

    /// Maximum number of stored search-history entries
    pub history_limit: usize,

    /// Capacity of the event broadcast channel
    pub event_buffer: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("key_value_store", &"KeyValueStore { ... }")
            .field("transport", &"CatalogTransport { ... }")
            .field("data_dir", &self.data_dir)
            .field("api_base_url", &self.api_base_url)
            .field("history_limit", &self.history_limit)
            .field("event_buffer", &self.event_buffer)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - History limit is greater than 0
    /// - Event buffer capacity is greater than 0
    /// - Base URL, when set, is not blank
    pub fn validate(&self) -> Result<()> {
        if self.history_limit == 0 {
            return Err(Error::Config(
                "History limit must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer == 0 {
            return Err(Error::Config(
                "Event buffer capacity must be greater than 0".to_string(),
            ));
        }

        if let Some(url) = &self.api_base_url {
            if url.trim().is_empty() {
                return Err(Error::Config("API base URL cannot be blank".to_string()));
            }
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn key_value_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "KeyValueStore".to_string(),
        message: "KeyValueStore implementation is required for shelf and settings persistence. \
                 Desktop: enable the 'desktop-shims' feature to use the default JsonFileStore. \
                 Mobile: inject platform-native storage (UserDefaults/SharedPreferences). \
                 Web: inject localStorage-backed storage."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn transport_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "CatalogTransport".to_string(),
        message: "CatalogTransport implementation is required for remote catalog access. \
                 Desktop: enable the 'desktop-shims' feature and set api_base_url to use the \
                 default ReqwestTransport. \
                 Other platforms: inject a host HTTP client."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_key_value_store(data_dir: Option<&PathBuf>) -> Result<Arc<dyn KeyValueStore>> {
    use bridge_desktop::JsonFileStore;

    let store = match data_dir {
        Some(dir) => JsonFileStore::new(dir.clone()),
        None => JsonFileStore::in_user_data("reader-platform"),
    }
    .map_err(|e| Error::Internal(format!("Failed to initialize default KeyValueStore: {}", e)))?;

    Ok(Arc::new(store))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_key_value_store(
    _data_dir: Option<&PathBuf>,
) -> Result<Arc<dyn KeyValueStore>> {
    Err(key_value_store_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_transport(api_base_url: Option<&String>) -> Result<Arc<dyn CatalogTransport>> {
    use bridge_desktop::ReqwestTransport;

    let base_url = api_base_url.ok_or_else(|| {
        Error::Config(
            "The default transport needs a catalog base URL. Use .api_base_url() to set it, \
             or inject a CatalogTransport."
                .to_string(),
        )
    })?;

    Ok(Arc::new(ReqwestTransport::new(base_url.clone())))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_transport(_api_base_url: Option<&String>) -> Result<Arc<dyn CatalogTransport>> {
    Err(transport_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Use this builder to incrementally set configuration options and then
/// call [`build()`](CoreConfigBuilder::build) to create the final config.
/// The builder validates required dependencies and provides helpful error
/// messages.
#[derive(Default)]
pub struct CoreConfigBuilder {
    key_value_store: Option<Arc<dyn KeyValueStore>>,
    transport: Option<Arc<dyn CatalogTransport>>,
    data_dir: Option<PathBuf>,
    api_base_url: Option<String>,
    history_limit: Option<usize>,
    event_buffer: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the key-value store implementation.
    ///
    /// If not provided, the desktop default (JSON files under the user data
    /// directory) will be used when the `desktop-shims` feature is enabled.
    pub fn key_value_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.key_value_store = Some(store);
        self
    }

    /// Sets the catalog transport implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) will be used when
    /// the `desktop-shims` feature is enabled; that default requires
    /// [`api_base_url`](Self::api_base_url).
    pub fn transport(mut self, transport: Arc<dyn CatalogTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the directory the default JSON-file store writes into.
    ///
    /// Ignored when a custom key-value store is injected.
    pub fn data_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Sets the catalog API base URL.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the maximum number of stored search-history entries.
    ///
    /// Default: 20
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Sets the capacity of the event broadcast channel.
    ///
    /// Default: 100
    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = Some(capacity);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - Required bridges are missing (KeyValueStore, CatalogTransport)
    /// - Configuration values are invalid
    pub fn build(self) -> Result<CoreConfig> {
        let key_value_store = match self.key_value_store {
            Some(store) => store,
            None => provide_default_key_value_store(self.data_dir.as_ref())?,
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => provide_default_transport(self.api_base_url.as_ref())?,
        };

        let config = CoreConfig {
            key_value_store,
            transport,
            data_dir: self.data_dir,
            api_base_url: self.api_base_url,
            history_limit: self.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
            event_buffer: self.event_buffer.unwrap_or(DEFAULT_EVENT_BUFFER),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::BridgeError;
    use bridge_traits::http::{HttpMethod, TransportResponse};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockKeyValueStore {
        entries: Mutex<HashMap<String, String>>,
    }

    impl KeyValueStore for MockKeyValueStore {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, BridgeError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> std::result::Result<(), BridgeError> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> std::result::Result<(), BridgeError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    struct MockTransport;

    #[async_trait]
    impl CatalogTransport for MockTransport {
        async fn request(
            &self,
            _method: HttpMethod,
            _path: &str,
            _body: Option<serde_json::Value>,
        ) -> std::result::Result<TransportResponse, BridgeError> {
            Ok(TransportResponse {
                status: 200,
                body: Default::default(),
            })
        }
    }

    fn builder_with_mocks() -> CoreConfigBuilder {
        CoreConfig::builder()
            .key_value_store(Arc::new(MockKeyValueStore::default()))
            .transport(Arc::new(MockTransport))
    }

    #[test]
    fn test_builder_with_all_required_fields() {
        let config = builder_with_mocks().build().unwrap();

        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.event_buffer, DEFAULT_EVENT_BUFFER);
        assert!(config.api_base_url.is_none());
    }

    #[test]
    fn test_builder_with_custom_limits() {
        let config = builder_with_mocks()
            .history_limit(50)
            .event_buffer(16)
            .build()
            .unwrap();

        assert_eq!(config.history_limit, 50);
        assert_eq!(config.event_buffer, 16);
    }

    #[test]
    fn test_validate_rejects_zero_history_limit() {
        let result = builder_with_mocks().history_limit(0).build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("History limit must be greater than 0"));
    }

    #[test]
    fn test_validate_rejects_zero_event_buffer() {
        let result = builder_with_mocks().event_buffer(0).build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Event buffer capacity"));
    }

    #[test]
    fn test_validate_rejects_blank_base_url() {
        let result = builder_with_mocks().api_base_url("   ").build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("API base URL cannot be blank"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_key_value_store_is_capability_error() {
        let result = CoreConfig::builder()
            .transport(Arc::new(MockTransport))
            .build();

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("KeyValueStore"));
        assert!(err_msg.contains("persistence"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_transport_is_capability_error() {
        let result = CoreConfig::builder()
            .key_value_store(Arc::new(MockKeyValueStore::default()))
            .build();

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("CatalogTransport"));
        assert!(err_msg.contains("catalog access"));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_desktop_default_transport_requires_base_url() {
        let result = CoreConfig::builder()
            .key_value_store(Arc::new(MockKeyValueStore::default()))
            .build();

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("base URL"));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_build_with_desktop_defaults() {
        use std::sync::atomic::{AtomicU32, Ordering};

        static DIR_SEQ: AtomicU32 = AtomicU32::new(0);
        let dir = std::env::temp_dir().join(format!(
            "core-runtime-test-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::SeqCst)
        ));

        let config = CoreConfig::builder()
            .data_dir(&dir)
            .api_base_url("https://catalog.example.com")
            .build()
            .expect("desktop defaults should succeed");

        config.key_value_store.set("probe", "ok").unwrap();
        assert_eq!(
            config.key_value_store.get("probe").unwrap().as_deref(),
            Some("ok")
        );

        drop(config);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = builder_with_mocks().history_limit(7).build().unwrap();

        let cloned = config.clone();
        assert_eq!(cloned.history_limit, config.history_limit);
        assert_eq!(cloned.event_buffer, config.event_buffer);
    }
}
