// =============================================================================
// CACHE CONSTANTS
// =============================================================================

/// Key of the single cache entry holding every category record
pub const CATEGORY_CACHE_KEY: &str = "ms-category:categories:";

/// Default lifetime of the cached snapshot (1 day)
pub const DEFAULT_CATEGORY_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// Circuit breaker guarding cache reads and refreshes
pub const CATEGORY_CACHE_BREAKER: &str = "category-cache-breaker";

/// Retry policy wrapped around cache refreshes
pub const CATEGORY_CACHE_RETRY: &str = "category-cache-retry";

// =============================================================================
// ERROR CODES
// =============================================================================

pub const UNEXPECTED_EXCEPTION_CODE: &str = "UNEXPECTED_EXCEPTION";

/// Message sent for store failures; details stay in the logs
pub const UNEXPECTED_EXCEPTION_MESSAGE: &str = "An unexpected error occurred";

pub const CATEGORY_NOT_FOUND_CODE: &str = "CATEGORY_NOT_FOUND";

pub const CANNOT_DELETE_SUBCATEGORY_CODE: &str = "CANNOT_DELETE_SUBCATEGORY";

pub const VALIDATION_EXCEPTION_CODE: &str = "VALIDATION_EXCEPTION";

pub const METHOD_NOT_ALLOWED_CODE: &str = "METHOD_NOT_ALLOWED";
