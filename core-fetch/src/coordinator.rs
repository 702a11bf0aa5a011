//! # Fetch Coordinator
//!
//! Deduplicates and caches remote lookups for one resource.
//!
//! ## Overview
//!
//! A `FetchCoordinator` owns the fetch state for exactly one remote resource
//! (search, detail, or content) and guarantees:
//! - One underlying call per key while a request is in flight; concurrent
//!   callers join the same shared future.
//! - A repeated request for the current key returns the cached result with
//!   zero calls until the key changes or the cache is invalidated.
//! - Stale-drop ordering: a completion is applied to coordinator state only
//!   if its key is still the current one. Superseded completions are
//!   discarded, though their original callers still receive their results.
//! - Reset-on-error: a failed fetch whose key is still current clears the
//!   tracked key, the cached result, and the in-flight slot, so the same key
//!   can be retried with a fresh call.
//!
//! The state mutex is never held across an await; in-flight work is a
//! `futures` [`Shared`] future that is additionally driven by a spawned task
//! so it completes even when every caller has been cancelled.

use crate::error::{FetchError, Result};
use async_trait::async_trait;
use core_store::BookId;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// A key a coordinator can dedupe and cache on.
pub trait FetchKey: Clone + Eq + fmt::Debug + Send + Sync + 'static {
    /// Blank keys are rejected before any state is touched.
    fn is_blank(&self) -> bool {
        false
    }
}

impl FetchKey for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl FetchKey for BookId {
    fn is_blank(&self) -> bool {
        BookId::is_blank(self)
    }
}

/// The remote side of a coordinator: one async lookup per key.
#[async_trait]
pub trait RemoteFetch: Send + Sync + 'static {
    type Key: FetchKey;
    type Output: Clone + Send + Sync + 'static;

    async fn fetch(&self, key: Self::Key) -> Result<Self::Output>;
}

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T>>>;

struct FetchState<K, T> {
    last_key: Option<K>,
    last_result: Option<T>,
    in_flight: Option<(K, SharedFetch<T>)>,
}

impl<K, T> Default for FetchState<K, T> {
    fn default() -> Self {
        Self {
            last_key: None,
            last_result: None,
            in_flight: None,
        }
    }
}

pub struct FetchCoordinator<F: RemoteFetch> {
    resource: &'static str,
    fetcher: Arc<F>,
    state: Arc<Mutex<FetchState<F::Key, F::Output>>>,
}

impl<F: RemoteFetch> FetchCoordinator<F> {
    /// Create a coordinator for one resource. `resource` is a stable label
    /// used in log fields ("search", "detail", "chapter").
    pub fn new(resource: &'static str, fetcher: F) -> Self {
        Self {
            resource,
            fetcher: Arc::new(fetcher),
            state: Arc::new(Mutex::new(FetchState::default())),
        }
    }

    /// Fetch the value for `key`, deduplicating against in-flight work and
    /// serving the cached result when the key is unchanged.
    pub async fn request(&self, key: F::Key) -> Result<F::Output> {
        if key.is_blank() {
            return Err(FetchError::Validation("blank fetch key".to_string()));
        }

        let fut = {
            let mut state = self.lock();

            if state.last_key.as_ref() == Some(&key) {
                if let Some(cached) = state.last_result.clone() {
                    debug!(resource = self.resource, key = ?key, "Serving cached result");
                    return Ok(cached);
                }

                match &state.in_flight {
                    Some((in_key, fut)) if in_key == &key => {
                        debug!(resource = self.resource, key = ?key, "Joining in-flight fetch");
                        fut.clone()
                    }
                    _ => self.begin(&mut state, key),
                }
            } else {
                // Switching keys drops the previous cached result; serving it
                // for the new key would be wrong.
                state.last_key = Some(key.clone());
                state.last_result = None;
                self.begin(&mut state, key)
            }
        };

        fut.await
    }

    /// Most recently applied result, if any.
    pub fn last(&self) -> Option<F::Output> {
        self.lock().last_result.clone()
    }

    /// The key the coordinator currently tracks.
    pub fn current_key(&self) -> Option<F::Key> {
        self.lock().last_key.clone()
    }

    /// Forget the tracked key and cached result. An in-flight fetch is left
    /// to finish; its completion will be dropped as stale.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.last_key = None;
        state.last_result = None;
    }

    fn begin(
        &self,
        state: &mut FetchState<F::Key, F::Output>,
        key: F::Key,
    ) -> SharedFetch<F::Output> {
        debug!(resource = self.resource, key = ?key, "Starting fetch");

        let fetcher = Arc::clone(&self.fetcher);
        let shared_state = Arc::clone(&self.state);
        let resource = self.resource;
        let fut_key = key.clone();

        let fut = async move {
            let result = fetcher.fetch(fut_key.clone()).await;

            let mut state = shared_state
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            if matches!(&state.in_flight, Some((in_key, _)) if in_key == &fut_key) {
                state.in_flight = None;
            }

            if state.last_key.as_ref() == Some(&fut_key) {
                match &result {
                    Ok(output) => state.last_result = Some(output.clone()),
                    Err(e) => {
                        warn!(
                            resource,
                            key = ?fut_key,
                            error = %e,
                            "Fetch failed, resetting coordinator state"
                        );
                        state.last_key = None;
                        state.last_result = None;
                    }
                }
            } else {
                debug!(resource, key = ?fut_key, "Dropping stale completion");
            }

            result
        }
        .boxed()
        .shared();

        state.in_flight = Some((key, fut.clone()));
        // Drive the fetch to completion even if every caller is cancelled,
        // so the state transition above always happens.
        tokio::spawn(fut.clone());
        fut
    }

    fn lock(&self) -> MutexGuard<'_, FetchState<F::Key, F::Output>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    struct EchoFetch {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RemoteFetch for EchoFetch {
        type Key = String;
        type Output = String;

        async fn fetch(&self, key: String) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("value:{}", key))
        }
    }

    /// Echo fetcher that blocks on a per-key gate until the test releases it.
    struct GatedFetch {
        calls: Arc<AtomicUsize>,
        gates: HashMap<String, Arc<Semaphore>>,
    }

    #[async_trait]
    impl RemoteFetch for GatedFetch {
        type Key = String;
        type Output = String;

        async fn fetch(&self, key: String) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = self.gates.get(&key) {
                let permit = gate
                    .acquire()
                    .await
                    .map_err(|_| FetchError::Network("gate closed".to_string()))?;
                permit.forget();
            }
            Ok(format!("value:{}", key))
        }
    }

    struct FailingFetch {
        calls: Arc<AtomicUsize>,
        fail_first: AtomicUsize,
    }

    #[async_trait]
    impl RemoteFetch for FailingFetch {
        type Key = String;
        type Output = String;

        async fn fetch(&self, key: String) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first.load(Ordering::SeqCst) > 0 {
                self.fail_first.fetch_sub(1, Ordering::SeqCst);
                return Err(FetchError::Network("connection refused".to_string()));
            }
            Ok(format!("value:{}", key))
        }
    }

    #[tokio::test]
    async fn test_repeated_key_serves_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let coordinator = FetchCoordinator::new(
            "test",
            EchoFetch {
                calls: Arc::clone(&calls),
            },
        );

        assert_eq!(coordinator.request("k".to_string()).await.unwrap(), "value:k");
        assert_eq!(coordinator.request("k".to_string()).await.unwrap(), "value:k");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        coordinator.invalidate();
        assert_eq!(coordinator.request("k".to_string()).await.unwrap(), "value:k");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Semaphore::new(0));
        let coordinator = Arc::new(FetchCoordinator::new(
            "test",
            GatedFetch {
                calls: Arc::clone(&calls),
                gates: HashMap::from([("k".to_string(), Arc::clone(&gate))]),
            },
        ));

        let first = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.request("k".to_string()).await }
        });
        let second = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.request("k".to_string()).await }
        });

        tokio::task::yield_now().await;
        gate.add_permits(1);

        assert_eq!(first.await.unwrap().unwrap(), "value:k");
        assert_eq!(second.await.unwrap().unwrap(), "value:k");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_superseded_completion_is_dropped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Semaphore::new(0));
        let coordinator = Arc::new(FetchCoordinator::new(
            "test",
            GatedFetch {
                calls: Arc::clone(&calls),
                gates: HashMap::from([("a".to_string(), Arc::clone(&gate))]),
            },
        ));

        let stale = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.request("a".to_string()).await }
        });
        tokio::task::yield_now().await;

        // A newer key supersedes the in-flight "a" fetch.
        assert_eq!(
            coordinator.request("b".to_string()).await.unwrap(),
            "value:b"
        );

        gate.add_permits(1);
        // The superseded caller still gets its own result...
        assert_eq!(stale.await.unwrap().unwrap(), "value:a");
        // ...but coordinator state kept the newer key's result.
        assert_eq!(coordinator.last().as_deref(), Some("value:b"));
        assert_eq!(coordinator.current_key().as_deref(), Some("b"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_resets_state_and_allows_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let coordinator = FetchCoordinator::new(
            "test",
            FailingFetch {
                calls: Arc::clone(&calls),
                fail_first: AtomicUsize::new(1),
            },
        );

        let err = coordinator.request("k".to_string()).await.unwrap_err();
        assert_eq!(err, FetchError::Network("connection refused".to_string()));
        assert!(coordinator.last().is_none());
        assert!(coordinator.current_key().is_none());

        // The same key retries with a fresh call instead of being stuck.
        assert_eq!(coordinator.request("k".to_string()).await.unwrap(), "value:k");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_blank_key_is_rejected_without_state_change() {
        let calls = Arc::new(AtomicUsize::new(0));
        let coordinator = FetchCoordinator::new(
            "test",
            EchoFetch {
                calls: Arc::clone(&calls),
            },
        );

        let err = coordinator.request("   ".to_string()).await.unwrap_err();
        assert!(matches!(err, FetchError::Validation(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(coordinator.current_key().is_none());
    }

    #[tokio::test]
    async fn test_key_switch_drops_previous_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let coordinator = FetchCoordinator::new(
            "test",
            EchoFetch {
                calls: Arc::clone(&calls),
            },
        );

        coordinator.request("a".to_string()).await.unwrap();
        coordinator.request("b".to_string()).await.unwrap();
        assert_eq!(coordinator.last().as_deref(), Some("value:b"));

        // Returning to "a" refetches; its cache entry was dropped on switch.
        coordinator.request("a".to_string()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
