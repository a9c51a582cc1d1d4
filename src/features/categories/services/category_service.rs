use std::sync::Arc;

use validator::Validate;

use super::category_cache_service::{CacheLookup, CategoryCacheService};
use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategorySeparation, CategoryTreeDto, CreateCategoriesDto, UpdateCategoryDto,
};
use crate::features::categories::models::{Category, CategoryStatus};
use crate::features::categories::stores::{
    ensure_valid_parent, CategoryStore, CategoryTransaction,
};

/// Service for category operations.
///
/// Each write runs its store calls in one unit of work and refreshes the cache only after the
/// unit has committed.
pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
    cache: Arc<CategoryCacheService>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CategoryStore>, cache: Arc<CategoryCacheService>) -> Self {
        Self { store, cache }
    }

    /// List active categories as a two-level tree.
    ///
    /// Served from the cache. A miss forces a refresh; if that fails too the tree is empty.
    /// When the cache backend is unavailable the records are read from the store directly.
    pub async fn list(&self) -> Result<Vec<CategoryTreeDto>> {
        tracing::info!("Listing categories");

        let categories = match self.cache.read().await {
            CacheLookup::Hit(categories) => categories,
            CacheLookup::Miss => self.cache.refresh().await.unwrap_or_default(),
            CacheLookup::Unavailable => {
                tracing::warn!("Category cache unavailable, reading from store");
                self.store.find_all().await?
            }
        };

        let active: Vec<Category> = categories.into_iter().filter(|c| c.is_active()).collect();
        let tree = CategoryTreeDto::build_tree(&active);

        tracing::info!("Listed {} base categories", tree.len());
        Ok(tree)
    }

    /// Create a batch of categories; bases are written before subs in one transaction
    pub async fn create(&self, dto: CreateCategoriesDto) -> Result<()> {
        dto.validate()?;
        let details = dto
            .categories
            .ok_or_else(|| AppError::validation("categories", "Categories list cannot be null"))?;

        tracing::info!("Creating {} categories", details.len());

        let records = CategorySeparation::partition(details).into_create_categories();
        let mut tx = self.store.begin().await?;
        let created = tx.insert_many(records).await?;
        tx.commit().await?;

        tracing::info!(
            "Created categories with ids {:?}",
            created.iter().map(|c| c.id).collect::<Vec<_>>()
        );

        self.cache.refresh_in_background();
        Ok(())
    }

    /// Update name, picture and parent of a category
    pub async fn update(&self, id: i64, dto: UpdateCategoryDto) -> Result<()> {
        dto.validate()?;
        tracing::info!("Updating category {}", id);

        let mut tx = self.store.begin().await?;
        let existing = tx
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::category_not_found(id))?;

        if let Some(base_id) = dto.base_id {
            check_new_parent(tx.as_mut(), &existing, base_id).await?;
        }

        let updated = Category {
            name: dto.name,
            picture: dto.picture,
            base_id: dto.base_id,
            ..existing
        };
        tx.save_many(vec![updated]).await?;
        tx.commit().await?;

        tracing::info!("Updated category {} (base {:?})", id, dto.base_id);

        self.cache.refresh_in_background();
        Ok(())
    }

    /// Soft-delete a base category together with its direct sub-categories
    pub async fn delete(&self, id: i64) -> Result<()> {
        tracing::info!("Deleting category {}", id);

        let mut tx = self.store.begin().await?;
        let base = tx
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::category_not_found(id))?;

        if !base.is_base() {
            return Err(AppError::cannot_delete_subcategory(id));
        }

        let mut batch = vec![base];
        batch.extend(tx.find_by_base_id(id).await?);
        for category in &mut batch {
            category.status = CategoryStatus::Deleted;
        }

        let deleted = tx.save_many(batch).await?;
        tx.commit().await?;

        tracing::info!(
            "Soft-deleted categories with ids {:?}",
            deleted.iter().map(|c| c.id).collect::<Vec<_>>()
        );

        self.cache.refresh_in_background();
        Ok(())
    }

    /// Wait for cache refreshes dispatched by earlier writes
    pub async fn wait_for_background_refreshes(&self) {
        self.cache.wait_for_background_refreshes().await;
    }
}

/// Keep the hierarchy two levels deep when `category` moves under `base_id`
async fn check_new_parent(
    tx: &mut dyn CategoryTransaction,
    category: &Category,
    base_id: i64,
) -> Result<()> {
    if base_id == category.id {
        return Err(AppError::validation(
            "baseId",
            "Category cannot be its own parent",
        ));
    }

    let parent = tx.find_by_id(base_id).await?;
    ensure_valid_parent(base_id, parent.as_ref())?;

    if category.is_base() {
        let has_active_children = tx
            .find_by_base_id(category.id)
            .await?
            .iter()
            .any(|c| c.is_active());
        if has_active_children {
            return Err(AppError::validation(
                "baseId",
                format!(
                    "Category {} has subcategories and cannot become a subcategory",
                    category.id
                ),
            ));
        }
    }

    Ok(())
}
