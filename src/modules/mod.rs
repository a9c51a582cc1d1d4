//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the cache backends and the resilience policies wrapped around them.

pub mod cache;
pub mod resilience;
