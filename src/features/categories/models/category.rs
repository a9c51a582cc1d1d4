use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

/// Category status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "category_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryStatus {
    Active,
    Deleted,
}

/// Database model for category.
///
/// A category without `base_id` is a base category; one with `base_id` is a sub-category of
/// that base. Rows are never removed, deletion flips `status` to `DELETED`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub base_id: Option<i64>,
    pub picture: String,
    pub status: CategoryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn is_base(&self) -> bool {
        self.base_id.is_none()
    }

    pub fn is_active(&self) -> bool {
        self.status == CategoryStatus::Active
    }
}

/// Data required to insert a new category; id and timestamps come from the store
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCategory {
    pub name: String,
    pub base_id: Option<i64>,
    pub picture: String,
    pub status: CategoryStatus,
}
