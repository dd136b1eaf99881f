//! Response cache for augmented answers.
//!
//! Bounded LRU store keyed by (normalized query, matched document id) with a
//! single-flight guarantee: concurrent misses on the same key share one
//! computation. The computation runs on its own tokio task, so a waiter that
//! is dropped (client disconnect) never cancels it; the result still lands in
//! the cache for everyone else.

use crate::augmentation::{AugmentationError, AugmentationErrorKind};
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default number of cached answers.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Identifies one cached answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub normalized_query: String,
    pub document_id: String,
}

impl CacheKey {
    pub fn new(normalized_query: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            normalized_query: normalized_query.into(),
            document_id: document_id.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

type Computation = Shared<BoxFuture<'static, Result<String, AugmentationError>>>;

struct CacheState {
    entries: LruCache<CacheKey, CacheEntry>,
    in_flight: HashMap<CacheKey, Computation>,
}

/// Thread-safe, cloneable handle to one cache. Clones share storage.
#[derive(Clone)]
pub struct ResponseCache {
    state: Arc<Mutex<CacheState>>,
    capacity: NonZeroUsize,
}

impl ResponseCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                in_flight: HashMap::new(),
            })),
            capacity,
        }
    }

    /// Return the cached answer for `key`, or compute it exactly once.
    ///
    /// `compute` is only invoked when there is neither an entry nor an
    /// in-flight computation for `key`. Failures are handed to every waiter
    /// and are not cached, so the next call for the key tries again.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: CacheKey,
        compute: F,
    ) -> Result<String, AugmentationError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, AugmentationError>> + Send + 'static,
    {
        let computation = {
            let mut state = lock(&self.state);

            if let Some(entry) = state.entries.get(&key) {
                tracing::debug!(document_id = %key.document_id, "Response cache hit");
                return Ok(entry.answer.clone());
            }

            if let Some(pending) = state.in_flight.get(&key).cloned() {
                tracing::debug!(document_id = %key.document_id, "Joining in-flight augmentation");
                pending
            } else {
                tracing::debug!(document_id = %key.document_id, "Response cache miss");
                // Registered under the same lock as the lookup, so no second
                // caller can start a computation for this key.
                let computation = self.spawn_computation(key.clone(), compute());
                state.in_flight.insert(key, computation.clone());
                computation
            }
        };

        computation.await
    }

    fn spawn_computation<Fut>(&self, key: CacheKey, work: Fut) -> Computation
    where
        Fut: Future<Output = Result<String, AugmentationError>> + Send + 'static,
    {
        let shared_state = Arc::clone(&self.state);

        let handle = tokio::spawn(async move {
            let result = AssertUnwindSafe(work)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    Err(AugmentationError::new(
                        AugmentationErrorKind::Unknown,
                        "augmentation task panicked",
                    ))
                });

            let mut state = lock(&shared_state);
            state.in_flight.remove(&key);
            if let Ok(ref answer) = result {
                let entry = CacheEntry {
                    key: key.clone(),
                    answer: answer.clone(),
                    created_at: Utc::now(),
                };
                if let Some((evicted, _)) = state.entries.push(key.clone(), entry) {
                    if evicted != key {
                        tracing::debug!(
                            document_id = %evicted.document_id,
                            "Evicted least recently used answer"
                        );
                    }
                }
            }

            result
        });

        async move {
            handle.await.unwrap_or_else(|e| {
                Err(AugmentationError::new(
                    AugmentationErrorKind::Unknown,
                    format!("augmentation task failed: {}", e),
                ))
            })
        }
        .boxed()
        .shared()
    }

    /// Look up an answer without computing. Counts as a use for LRU order.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        lock(&self.state)
            .entries
            .get(key)
            .map(|entry| entry.answer.clone())
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        lock(&self.state).entries.contains(key)
    }

    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn in_flight(&self) -> usize {
        lock(&self.state).in_flight.len()
    }

    /// Drop every stored answer. In-flight computations are left running.
    pub fn clear(&self) {
        lock(&self.state).entries.clear();
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
