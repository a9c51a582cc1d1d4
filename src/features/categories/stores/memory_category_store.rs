use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use super::category_store::{ensure_valid_parent, CategoryStore, CategoryTransaction};
use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, CreateCategory};

#[derive(Debug, Clone, Default)]
struct StoreState {
    last_id: i64,
    /// Kept in id order
    rows: Vec<Category>,
}

impl StoreState {
    fn get(&self, id: i64) -> Option<&Category> {
        self.rows.iter().find(|c| c.id == id)
    }
}

/// Process-local category store with sequential ids starting at 1.
///
/// A unit of work holds the write lock for its whole lifetime and edits a copy of the state,
/// which is swapped in on commit.
#[derive(Debug, Default)]
pub struct InMemoryCategoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed record with the given id
    pub async fn get(&self, id: i64) -> Option<Category> {
        self.state.read().await.get(id).cloned()
    }
}

#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn find_all(&self) -> Result<Vec<Category>> {
        Ok(self.state.read().await.rows.clone())
    }

    async fn begin(&self) -> Result<Box<dyn CategoryTransaction>> {
        let committed = Arc::clone(&self.state).write_owned().await;
        let working = committed.clone();
        Ok(Box::new(InMemoryCategoryTransaction { committed, working }))
    }
}

struct InMemoryCategoryTransaction {
    committed: OwnedRwLockWriteGuard<StoreState>,
    working: StoreState,
}

#[async_trait]
impl CategoryTransaction for InMemoryCategoryTransaction {
    async fn find_by_id(&mut self, id: i64) -> Result<Option<Category>> {
        Ok(self.working.get(id).cloned())
    }

    async fn find_by_base_id(&mut self, base_id: i64) -> Result<Vec<Category>> {
        Ok(self
            .working
            .rows
            .iter()
            .filter(|c| c.base_id == Some(base_id))
            .cloned()
            .collect())
    }

    async fn insert_many(&mut self, categories: Vec<CreateCategory>) -> Result<Vec<Category>> {
        let mut inserted = Vec::with_capacity(categories.len());

        for category in categories {
            if let Some(base_id) = category.base_id {
                ensure_valid_parent(base_id, self.working.get(base_id))?;
            }

            self.working.last_id += 1;
            let now = Utc::now();
            let row = Category {
                id: self.working.last_id,
                name: category.name,
                base_id: category.base_id,
                picture: category.picture,
                status: category.status,
                created_at: now,
                updated_at: now,
            };
            self.working.rows.push(row.clone());
            inserted.push(row);
        }

        Ok(inserted)
    }

    async fn save_many(&mut self, categories: Vec<Category>) -> Result<Vec<Category>> {
        let mut saved = Vec::with_capacity(categories.len());

        for category in categories {
            let row = self
                .working
                .rows
                .iter_mut()
                .find(|c| c.id == category.id)
                .ok_or_else(|| AppError::category_not_found(category.id))?;

            row.name = category.name;
            row.base_id = category.base_id;
            row.picture = category.picture;
            row.status = category.status;
            row.updated_at = Utc::now();
            saved.push(row.clone());
        }

        Ok(saved)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let Self {
            mut committed,
            working,
        } = *self;
        *committed = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::models::CategoryStatus;
    use tokio_test::{assert_err, assert_ok};

    fn new_category(name: &str, base_id: Option<i64>) -> CreateCategory {
        CreateCategory {
            name: name.to_string(),
            base_id,
            picture: format!("{}.png", name),
            status: CategoryStatus::Active,
        }
    }

    async fn insert(store: &InMemoryCategoryStore, categories: Vec<CreateCategory>) -> Vec<Category> {
        let mut tx = store.begin().await.unwrap();
        let inserted = tx.insert_many(categories).await.unwrap();
        tx.commit().await.unwrap();
        inserted
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = InMemoryCategoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let inserted = assert_ok!(
            tx.insert_many(vec![
                new_category("Electronics", None),
                new_category("Phones", Some(1)),
            ])
            .await
        );
        assert_ok!(tx.commit().await);

        assert_eq!(inserted[0].id, 1);
        assert_eq!(inserted[1].id, 2);
        assert_eq!(inserted[1].base_id, Some(1));
        assert_eq!(store.find_all().await.unwrap(), inserted);
    }

    #[tokio::test]
    async fn test_uncommitted_unit_writes_nothing() {
        let store = InMemoryCategoryStore::new();

        let mut tx = store.begin().await.unwrap();
        tx.insert_many(vec![new_category("Electronics", None)])
            .await
            .unwrap();
        drop(tx);

        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_with_missing_parent_is_not_found() {
        let store = InMemoryCategoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let err = tx
            .insert_many(vec![
                new_category("Electronics", None),
                new_category("Phones", Some(99)),
            ])
            .await
            .unwrap_err();
        drop(tx);

        assert!(matches!(err, AppError::NotFound(ref msg) if msg.ends_with("99")));
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_under_subcategory_is_rejected() {
        let store = InMemoryCategoryStore::new();
        insert(
            &store,
            vec![
                new_category("Electronics", None),
                new_category("Phones", Some(1)),
            ],
        )
        .await;

        let mut tx = store.begin().await.unwrap();
        let err = tx
            .insert_many(vec![new_category("Android", Some(2))])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_insert_under_deleted_base_is_not_found() {
        let store = InMemoryCategoryStore::new();
        let mut rows = insert(&store, vec![new_category("Books", None)]).await;
        rows[0].status = CategoryStatus::Deleted;

        let mut tx = store.begin().await.unwrap();
        tx.save_many(rows).await.unwrap();
        let err = tx
            .insert_many(vec![new_category("Novels", Some(1))])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_save_of_unknown_id_is_not_found() {
        let store = InMemoryCategoryStore::new();
        let rows = insert(&store, vec![new_category("Books", None)]).await;

        let mut ghost = rows[0].clone();
        ghost.id = 42;

        let mut tx = store.begin().await.unwrap();
        assert_err!(tx.save_many(vec![ghost]).await);
    }

    #[tokio::test]
    async fn test_open_unit_blocks_other_writers() {
        let store = Arc::new(InMemoryCategoryStore::new());
        insert(&store, vec![new_category("Books", None)]).await;

        let mut tx = store.begin().await.unwrap();

        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                insert(&store, vec![new_category("Novels", Some(1))]).await;
            })
        };
        tokio::task::yield_now().await;
        assert!(!writer.is_finished());

        let children = tx.find_by_base_id(1).await.unwrap();
        assert!(children.is_empty());
        tx.commit().await.unwrap();

        writer.await.unwrap();
        assert_eq!(store.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_base_id_returns_direct_children() {
        let store = InMemoryCategoryStore::new();
        insert(
            &store,
            vec![
                new_category("Electronics", None),
                new_category("Books", None),
                new_category("Phones", Some(1)),
                new_category("Novels", Some(2)),
                new_category("Laptops", Some(1)),
            ],
        )
        .await;

        let mut tx = store.begin().await.unwrap();
        let children: Vec<String> = tx
            .find_by_base_id(1)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(children, vec!["Phones", "Laptops"]);
    }
}
