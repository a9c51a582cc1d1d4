use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, error, info};

use crate::core::error::AppError;
use crate::features::categories::models::Category;
use crate::features::categories::stores::CategoryStore;
use crate::modules::cache::{CacheBackend, CacheError};
use crate::modules::resilience::{CircuitBreaker, CircuitBreakerError, RetryPolicy};
use crate::shared::constants::CATEGORY_CACHE_KEY;

/// Outcome of reading the cached category snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(Vec<Category>),
    /// Nothing cached, or the entry expired
    Miss,
    /// Backend failed or the circuit is open; treat as an empty snapshot
    Unavailable,
}

#[derive(Debug, thiserror::Error)]
enum RefreshError {
    #[error("loading categories failed: {0}")]
    Store(#[from] AppError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Owns the single cached snapshot of every category record
pub struct CategoryCacheService {
    cache: Arc<dyn CacheBackend>,
    store: Arc<dyn CategoryStore>,
    breaker: Arc<CircuitBreaker>,
    retry: RetryPolicy,
    ttl: Duration,
    /// Background refreshes spawned and not yet finished
    in_flight: AtomicUsize,
    idle: Notify,
}

impl CategoryCacheService {
    pub fn new(
        cache: Arc<dyn CacheBackend>,
        store: Arc<dyn CategoryStore>,
        breaker: Arc<CircuitBreaker>,
        retry: RetryPolicy,
        ttl: Duration,
    ) -> Self {
        Self {
            cache,
            store,
            breaker,
            retry,
            ttl,
            in_flight: AtomicUsize::new(0),
            idle: Notify::new(),
        }
    }

    /// Read the snapshot through the circuit breaker. Never fails.
    pub async fn read(&self) -> CacheLookup {
        match self.breaker.call(|| self.read_snapshot()).await {
            Ok(Some(categories)) => {
                debug!(count = categories.len(), "Category cache hit");
                CacheLookup::Hit(categories)
            }
            Ok(None) => {
                debug!("Category cache miss");
                CacheLookup::Miss
            }
            Err(e) => {
                error!(
                    backend = self.cache.kind(),
                    circuit = ?self.breaker.state(),
                    error = %e,
                    "Category cache read failed, using empty fallback"
                );
                CacheLookup::Unavailable
            }
        }
    }

    /// Reload every record from the store and overwrite the cache entry.
    ///
    /// Returns the written records, or `None` once retries are exhausted or the circuit is
    /// open. A failed refresh leaves the previous entry in place.
    pub async fn refresh(&self) -> Option<Vec<Category>> {
        let result = self
            .retry
            .run(
                || self.breaker.call(|| self.load_and_store()),
                |e| !matches!(e, CircuitBreakerError::CircuitOpen { .. }),
            )
            .await;

        match result {
            Ok(categories) => {
                info!(count = categories.len(), "Category cache refreshed");
                Some(categories)
            }
            Err(e) => {
                error!(
                    backend = self.cache.kind(),
                    error = %e,
                    "Category cache refresh failed"
                );
                None
            }
        }
    }

    /// Refresh on a spawned task without waiting for it
    pub fn refresh_in_background(self: &Arc<Self>) {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let refresh = InFlightRefresh(Arc::clone(self));
        tokio::spawn(async move {
            refresh.0.refresh().await;
        });
    }

    /// Wait until every background refresh spawned so far has finished
    pub async fn wait_for_background_refreshes(&self) {
        loop {
            let idle = self.idle.notified();
            if self.in_flight.load(Ordering::Acquire) == 0 {
                return;
            }
            idle.await;
        }
    }

    async fn read_snapshot(&self) -> Result<Option<Vec<Category>>, CacheError> {
        let Some(raw) = self.cache.get(CATEGORY_CACHE_KEY).await? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CacheError::Serialization(e.to_string()))
    }

    async fn load_and_store(&self) -> Result<Vec<Category>, RefreshError> {
        let categories = self.store.find_all().await?;

        let payload = serde_json::to_string(&categories)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.cache.set(CATEGORY_CACHE_KEY, payload, self.ttl).await?;

        Ok(categories)
    }
}

/// Counts a spawned refresh until its task finishes or is dropped
struct InFlightRefresh(Arc<CategoryCacheService>);

impl Drop for InFlightRefresh {
    fn drop(&mut self) {
        if self.0.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}
