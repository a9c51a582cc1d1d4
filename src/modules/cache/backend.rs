use std::time::Duration;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection failed: {0}")]
    Connection(String),

    #[error("Cache command failed: {0}")]
    Command(String),

    #[error("Cache payload invalid: {0}")]
    Serialization(String),
}

/// Key/value store with per-entry expiry.
///
/// Writes replace the whole value, so a reader sees either the old or the new entry.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// `Ok(None)` when the key is absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Short label used in logs
    fn kind(&self) -> &'static str;
}
