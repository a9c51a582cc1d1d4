mod category_cache_service;
mod category_service;

pub use category_cache_service::CategoryCacheService;
pub use category_service::CategoryService;
