//! Catalog Transport Abstraction
//!
//! Provides the async transport seam the fetch layer talks through.

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{BridgeError, Result};

/// HTTP method types
///
/// The catalog API is POST-with-JSON-body throughout; GET exists for
/// health-check style endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Transport response
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

impl TransportResponse {
    /// Parse response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            BridgeError::OperationFailed(format!("JSON deserialization failed: {}", e))
        })
    }

    /// Get response body as UTF-8 string
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| BridgeError::OperationFailed(format!("Invalid UTF-8: {}", e)))
    }

    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if response status indicates a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if response status indicates a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_attempts: u32,
    /// Base delay between retries
    pub base_delay: std::time::Duration,
    /// Maximum delay between retries
    pub max_delay: std::time::Duration,
    /// Whether to use exponential backoff
    pub use_exponential_backoff: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: std::time::Duration::from_millis(100),
            max_delay: std::time::Duration::from_secs(30),
            use_exponential_backoff: true,
        }
    }
}

/// Async catalog transport trait
///
/// This trait abstracts the raw request client the host supplies. The fetch
/// layer builds every catalog call on top of `request(method, path, body)`
/// and interprets the response envelope itself; implementations only move
/// bytes. Implementations should handle:
/// - Base URL resolution (paths here are relative, e.g. `/novel/search`)
/// - Automatic retry on transient server errors
/// - TLS and connection pooling
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{CatalogTransport, HttpMethod};
/// use serde_json::json;
///
/// async fn ping(transport: &dyn CatalogTransport) -> Result<bool> {
///     let response = transport
///         .request(HttpMethod::Post, "/novel/search", Some(json!({"keyword": "x"})))
///         .await?;
///     Ok(response.is_success())
/// }
/// ```
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    /// Execute a request against the catalog API
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network connection fails
    /// - Request times out
    /// - Maximum retries exceeded
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<TransportResponse>;
}
