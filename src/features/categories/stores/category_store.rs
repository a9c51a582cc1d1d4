use async_trait::async_trait;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, CreateCategory};

/// Durable storage of category records
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Every committed record regardless of status, ordered by id
    async fn find_all(&self) -> Result<Vec<Category>>;

    /// Open a unit of work. Its writes become visible only on
    /// [`CategoryTransaction::commit`]; dropping it rolls everything back.
    async fn begin(&self) -> Result<Box<dyn CategoryTransaction>>;
}

/// Reads and writes that commit or fail together.
///
/// Records read through the unit stay locked until it ends, so no concurrent write can
/// slip in between a check and the write that depends on it.
#[async_trait]
pub trait CategoryTransaction: Send {
    /// Point lookup regardless of status
    async fn find_by_id(&mut self, id: i64) -> Result<Option<Category>>;

    /// Direct sub-categories of `base_id` regardless of status, ordered by id
    async fn find_by_base_id(&mut self, base_id: i64) -> Result<Vec<Category>>;

    /// Insert the batch in order and return the persisted records.
    ///
    /// A record's `base_id` may point at a base inserted earlier in the same batch. A missing
    /// or deleted parent fails with `NotFound` and a parent that is itself a sub-category fails
    /// with `Validation`.
    async fn insert_many(&mut self, categories: Vec<CreateCategory>) -> Result<Vec<Category>>;

    /// Overwrite name, parent, picture and status of existing records, stamping `updated_at`
    async fn save_many(&mut self, categories: Vec<Category>) -> Result<Vec<Category>>;

    async fn commit(self: Box<Self>) -> Result<()>;
}

/// Check the parent looked up for a new or re-parented sub-category.
///
/// A soft-deleted parent counts as missing.
pub(crate) fn ensure_valid_parent(parent_id: i64, parent: Option<&Category>) -> Result<()> {
    match parent {
        Some(parent) if !parent.is_active() => Err(AppError::category_not_found(parent_id)),
        Some(parent) if !parent.is_base() => Err(AppError::validation(
            "baseId",
            format!(
                "Category {} is a subcategory and cannot have subcategories",
                parent_id
            ),
        )),
        Some(_) => Ok(()),
        None => Err(AppError::category_not_found(parent_id)),
    }
}
