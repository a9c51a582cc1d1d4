//! Cache backends for the category snapshot
//!
//! - **Redis**: shared across instances, entries expire server-side (`SET EX`)
//! - **Memory**: process-local map for single-instance and local runs
//!
//! Backends only move strings; callers own serialization.

mod backend;
mod memory_cache;
mod redis_cache;

pub use backend::{CacheBackend, CacheError};
pub use memory_cache::MemoryCache;
pub use redis_cache::RedisCache;
