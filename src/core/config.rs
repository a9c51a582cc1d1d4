use std::env;
use std::time::Duration;

use crate::shared::constants::DEFAULT_CATEGORY_CACHE_TTL_SECS;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub resilience: ResilienceConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Where the category snapshot is cached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    /// Shared Redis instance (default)
    Redis,
    /// Process-local map, for single-instance and local runs
    Memory,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackendKind,
    pub redis_url: String,
    pub redis_pool_size: usize,
    pub redis_timeout: Duration,
    pub ttl: Duration,
}

/// Retry and circuit breaker settings for the category cache
#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    pub retry_max_attempts: u32,
    pub retry_initial_backoff: Duration,
    pub retry_backoff_multiplier: f64,
    pub retry_max_backoff: Duration,
    /// Percentage (0-100) of failed calls in the window that opens the breaker
    pub breaker_failure_rate_threshold: f64,
    pub breaker_sliding_window_size: usize,
    pub breaker_minimum_calls: usize,
    pub breaker_open_duration: Duration,
    pub breaker_half_open_calls: u32,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            cache: CacheConfig::from_env()?,
            resilience: ResilienceConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

/// Read an env var and parse it, falling back to `default` when unset
fn parse_env<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr + ToString,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|_| format!("{} must be a valid number", key))
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: parse_env("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_env("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_env(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_env("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_env("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl CacheConfig {
    const DEFAULT_REDIS_POOL_SIZE: usize = 16;
    const DEFAULT_REDIS_TIMEOUT_MS: u64 = 2000;

    pub fn from_env() -> Result<Self, String> {
        let backend = match env::var("CACHE_BACKEND")
            .unwrap_or_else(|_| "redis".to_string())
            .to_lowercase()
            .as_str()
        {
            "redis" => CacheBackendKind::Redis,
            "memory" => CacheBackendKind::Memory,
            other => {
                return Err(format!(
                    "CACHE_BACKEND must be 'redis' or 'memory', got '{}'",
                    other
                ))
            }
        };

        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let redis_pool_size = parse_env("REDIS_POOL_SIZE", Self::DEFAULT_REDIS_POOL_SIZE)?;
        let redis_timeout_ms = parse_env("REDIS_TIMEOUT_MS", Self::DEFAULT_REDIS_TIMEOUT_MS)?;
        let ttl_secs = parse_env("CACHE_TTL_SECS", DEFAULT_CATEGORY_CACHE_TTL_SECS)?;

        Ok(Self {
            backend,
            redis_url,
            redis_pool_size,
            redis_timeout: Duration::from_millis(redis_timeout_ms),
            ttl: Duration::from_secs(ttl_secs),
        })
    }
}

impl ResilienceConfig {
    const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
    const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;
    const DEFAULT_RETRY_BACKOFF_MULTIPLIER: f64 = 2.0;
    const DEFAULT_RETRY_MAX_BACKOFF_MS: u64 = 5000;
    const DEFAULT_BREAKER_FAILURE_RATE: f64 = 50.0;
    const DEFAULT_BREAKER_WINDOW_SIZE: usize = 10;
    const DEFAULT_BREAKER_MIN_CALLS: usize = 5;
    const DEFAULT_BREAKER_OPEN_SECS: u64 = 30;
    const DEFAULT_BREAKER_HALF_OPEN_CALLS: u32 = 3;

    pub fn from_env() -> Result<Self, String> {
        let retry_max_attempts =
            parse_env("CACHE_RETRY_MAX_ATTEMPTS", Self::DEFAULT_RETRY_MAX_ATTEMPTS)?;
        if retry_max_attempts == 0 {
            return Err("CACHE_RETRY_MAX_ATTEMPTS must be at least 1".to_string());
        }

        let breaker_failure_rate_threshold =
            parse_env("CACHE_BREAKER_FAILURE_RATE", Self::DEFAULT_BREAKER_FAILURE_RATE)?;
        if !(0.0..=100.0).contains(&breaker_failure_rate_threshold) {
            return Err("CACHE_BREAKER_FAILURE_RATE must be between 0 and 100".to_string());
        }

        Ok(Self {
            retry_max_attempts,
            retry_initial_backoff: Duration::from_millis(parse_env(
                "CACHE_RETRY_BACKOFF_MS",
                Self::DEFAULT_RETRY_BACKOFF_MS,
            )?),
            retry_backoff_multiplier: parse_env(
                "CACHE_RETRY_BACKOFF_MULTIPLIER",
                Self::DEFAULT_RETRY_BACKOFF_MULTIPLIER,
            )?,
            retry_max_backoff: Duration::from_millis(parse_env(
                "CACHE_RETRY_MAX_BACKOFF_MS",
                Self::DEFAULT_RETRY_MAX_BACKOFF_MS,
            )?),
            breaker_failure_rate_threshold,
            breaker_sliding_window_size: parse_env(
                "CACHE_BREAKER_WINDOW_SIZE",
                Self::DEFAULT_BREAKER_WINDOW_SIZE,
            )?,
            breaker_minimum_calls: parse_env(
                "CACHE_BREAKER_MIN_CALLS",
                Self::DEFAULT_BREAKER_MIN_CALLS,
            )?,
            breaker_open_duration: Duration::from_secs(parse_env(
                "CACHE_BREAKER_OPEN_SECS",
                Self::DEFAULT_BREAKER_OPEN_SECS,
            )?),
            breaker_half_open_calls: parse_env(
                "CACHE_BREAKER_HALF_OPEN_CALLS",
                Self::DEFAULT_BREAKER_HALF_OPEN_CALLS,
            )?,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "MS Category API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Two-level category catalog with cached tree listing".to_string());

        Ok(Self {
            title,
            version,
            description,
        })
    }
}
