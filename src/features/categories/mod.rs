//! Two-level category catalog: base categories and their sub-categories.
//!
//! Listing is served from a cached snapshot of every record; writes go to the store first and
//! then refresh the snapshot in the background.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/v1/categories` | Active categories as a tree |
//! | POST | `/v1/categories` | Create a batch of categories |
//! | PUT | `/v1/categories/{id}` | Update a category |
//! | DELETE | `/v1/categories/{id}` | Soft-delete a base category and its sub-categories |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;

pub use services::{CategoryCacheService, CategoryService};
pub use stores::{CategoryStore, PgCategoryStore};
