mod category_store;
#[cfg(test)]
mod memory_category_store;
mod pg_category_store;

pub(crate) use category_store::ensure_valid_parent;
pub use category_store::{CategoryStore, CategoryTransaction};
#[cfg(test)]
pub use memory_category_store::InMemoryCategoryStore;
pub use pg_category_store::PgCategoryStore;
