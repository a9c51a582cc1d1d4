#[cfg(test)]
use std::sync::Arc;
#[cfg(test)]
use std::time::Duration;

#[cfg(test)]
use async_trait::async_trait;

#[cfg(test)]
use crate::core::config::ResilienceConfig;
#[cfg(test)]
use crate::features::categories::services::{CategoryCacheService, CategoryService};
#[cfg(test)]
use crate::features::categories::stores::{CategoryStore, InMemoryCategoryStore};
#[cfg(test)]
use crate::modules::cache::{CacheBackend, CacheError};
#[cfg(test)]
use crate::modules::resilience::{CircuitBreaker, RetryPolicy};
#[cfg(test)]
use crate::shared::constants::{CATEGORY_CACHE_BREAKER, CATEGORY_CACHE_RETRY};

/// Cache backend that is always down
#[cfg(test)]
pub struct FailingCache;

#[cfg(test)]
#[async_trait]
impl CacheBackend for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Connection("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Connection("connection refused".to_string()))
    }

    fn kind(&self) -> &'static str {
        "failing"
    }
}

/// Resilience settings with millisecond backoff so failing paths finish quickly
#[cfg(test)]
pub fn test_resilience_config() -> ResilienceConfig {
    ResilienceConfig {
        retry_max_attempts: 2,
        retry_initial_backoff: Duration::from_millis(1),
        retry_backoff_multiplier: 2.0,
        retry_max_backoff: Duration::from_millis(5),
        breaker_failure_rate_threshold: 50.0,
        breaker_sliding_window_size: 10,
        breaker_minimum_calls: 5,
        breaker_open_duration: Duration::from_secs(30),
        breaker_half_open_calls: 1,
    }
}

#[cfg(test)]
pub fn category_cache_service(
    cache: Arc<dyn CacheBackend>,
    store: Arc<dyn CategoryStore>,
) -> Arc<CategoryCacheService> {
    let config = test_resilience_config();
    Arc::new(CategoryCacheService::new(
        cache,
        store,
        Arc::new(CircuitBreaker::new(CATEGORY_CACHE_BREAKER, (&config).into())),
        RetryPolicy::from_config(CATEGORY_CACHE_RETRY, &config),
        Duration::from_secs(60),
    ))
}

/// Category service over an empty in-memory store and the given cache backend
#[cfg(test)]
pub fn category_service(
    cache: Arc<dyn CacheBackend>,
) -> (Arc<CategoryService>, Arc<InMemoryCategoryStore>) {
    let store = Arc::new(InMemoryCategoryStore::new());
    let cache_service = category_cache_service(cache, store.clone());
    let service = Arc::new(CategoryService::new(store.clone(), cache_service));
    (service, store)
}
