use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::categories::dtos::{CategoryTreeDto, CreateCategoriesDto, UpdateCategoryDto};
use crate::features::categories::services::CategoryService;
use crate::shared::types::ApiResponse;

/// List active categories as a tree
///
/// Each base category carries its active sub-categories in `subCategories`.
#[utoipa::path(
    get,
    path = "/v1/categories",
    responses(
        (status = 200, description = "Category tree", body = ApiResponse<Vec<CategoryTreeDto>>),
        (status = 500, description = "Unexpected error")
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<Vec<CategoryTreeDto>>>> {
    let tree = service.list().await?;
    Ok(Json(ApiResponse::success(Some(tree), None)))
}

/// Create categories in one batch
///
/// Items without `baseId` become base categories; the rest are sub-categories of the base
/// they reference, which may be created in the same request.
#[utoipa::path(
    post,
    path = "/v1/categories",
    request_body = CreateCategoriesDto,
    responses(
        (status = 201, description = "Categories created"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Referenced base category not found")
    ),
    tag = "categories"
)]
pub async fn create_categories(
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CreateCategoriesDto>,
) -> Result<StatusCode> {
    service.create(dto).await?;
    Ok(StatusCode::CREATED)
}

/// Update a category
#[utoipa::path(
    put,
    path = "/v1/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category id")
    ),
    request_body = UpdateCategoryDto,
    responses(
        (status = 204, description = "Category updated"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Category or referenced base category not found")
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateCategoryDto>,
) -> Result<StatusCode> {
    service.update(id, dto).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a base category and its sub-categories
///
/// Sub-categories cannot be deleted on their own.
#[utoipa::path(
    delete,
    path = "/v1/categories/{id}",
    params(
        ("id" = i64, Path, description = "Base category id")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Category is a sub-category"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
