use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::core::middleware::method_not_allowed;
use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Create routes for the categories feature
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/v1/categories",
            get(handlers::list_categories).post(handlers::create_categories),
        )
        .route(
            "/v1/categories/{id}",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(service)
}
