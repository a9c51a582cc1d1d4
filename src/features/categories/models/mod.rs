mod category;

pub use category::{Category, CategoryStatus, CreateCategory};
