//! Mock storage implementations for testing.

mod category_store;
mod product_store;

pub use category_store::MockCategoryStore;
pub use product_store::MockProductStore;
