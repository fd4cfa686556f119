//! CategoryStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::model::{Category, NewCategory};

/// Interface for category persistence.
///
/// Category ids are chosen by the caller; inserting an id that already
/// exists fails with `StorageError::Conflict`.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Insert a category.
    async fn create(&self, category: NewCategory) -> Result<Category>;

    /// All categories in store order.
    async fn list(&self) -> Result<Vec<Category>>;
}
