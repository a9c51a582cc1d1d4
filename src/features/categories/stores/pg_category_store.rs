use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::category_store::{ensure_valid_parent, CategoryStore, CategoryTransaction};
use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, CreateCategory};

const SELECT_COLUMNS: &str = "id, name, base_id, picture, status, created_at, updated_at";

/// PostgreSQL-backed category store
pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn find_all(&self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories ORDER BY id",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn begin(&self) -> Result<Box<dyn CategoryTransaction>> {
        let tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin category transaction: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(Box::new(PgCategoryTransaction { tx }))
    }
}

/// One database transaction; dropping it without `commit` rolls back
pub struct PgCategoryTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CategoryTransaction for PgCategoryTransaction {
    async fn find_by_id(&mut self, id: i64) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE id = $1 FOR UPDATE",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    async fn find_by_base_id(&mut self, base_id: i64) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE base_id = $1 ORDER BY id FOR UPDATE",
            SELECT_COLUMNS
        ))
        .bind(base_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list subcategories of {}: {:?}", base_id, e);
            AppError::Database(e)
        })
    }

    async fn insert_many(&mut self, categories: Vec<CreateCategory>) -> Result<Vec<Category>> {
        let mut inserted = Vec::with_capacity(categories.len());

        for category in categories {
            if let Some(base_id) = category.base_id {
                // Sees rows inserted earlier in this transaction; the share lock waits out a
                // concurrent delete of the parent
                let parent = sqlx::query_as::<_, Category>(&format!(
                    "SELECT {} FROM categories WHERE id = $1 FOR SHARE",
                    SELECT_COLUMNS
                ))
                .bind(base_id)
                .fetch_optional(&mut *self.tx)
                .await?;

                ensure_valid_parent(base_id, parent.as_ref())?;
            }

            let row = sqlx::query_as::<_, Category>(&format!(
                r#"
                INSERT INTO categories (name, base_id, picture, status)
                VALUES ($1, $2, $3, $4)
                RETURNING {}
                "#,
                SELECT_COLUMNS
            ))
            .bind(&category.name)
            .bind(category.base_id)
            .bind(&category.picture)
            .bind(category.status)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert category '{}': {:?}", category.name, e);
                AppError::Database(e)
            })?;

            inserted.push(row);
        }

        Ok(inserted)
    }

    async fn save_many(&mut self, categories: Vec<Category>) -> Result<Vec<Category>> {
        let mut saved = Vec::with_capacity(categories.len());

        for category in categories {
            let row = sqlx::query_as::<_, Category>(&format!(
                r#"
                UPDATE categories
                SET name = $2, base_id = $3, picture = $4, status = $5, updated_at = NOW()
                WHERE id = $1
                RETURNING {}
                "#,
                SELECT_COLUMNS
            ))
            .bind(category.id)
            .bind(&category.name)
            .bind(category.base_id)
            .bind(&category.picture)
            .bind(category.status)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update category {}: {:?}", category.id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::category_not_found(category.id))?;

            saved.push(row);
        }

        Ok(saved)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit category transaction: {:?}", e);
            AppError::Database(e)
        })
    }
}
