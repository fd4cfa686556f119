//! Mock CategoryStore implementation for testing.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::{Category, NewCategory};
use crate::storage::{helpers, CategoryStore, Result, StorageError};

/// In-memory category store.
#[derive(Default)]
pub struct MockCategoryStore {
    categories: RwLock<Vec<Category>>,
    fail: RwLock<bool>,
}

impl MockCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    pub async fn stored_count(&self) -> usize {
        self.categories.read().await.len()
    }
}

#[async_trait]
impl CategoryStore for MockCategoryStore {
    async fn create(&self, category: NewCategory) -> Result<Category> {
        if *self.fail.read().await {
            return Err(StorageError::Mock("create failed".to_string()));
        }
        let mut categories = self.categories.write().await;
        if categories.iter().any(|c| c.id == category.id) {
            return Err(StorageError::Conflict(format!(
                "category {} already exists",
                category.id
            )));
        }
        let stored = Category {
            id: category.id,
            name: category.name,
            thumbnail: category.thumbnail,
            created_at: helpers::now(),
        };
        categories.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<Category>> {
        if *self.fail.read().await {
            return Err(StorageError::Mock("list failed".to_string()));
        }
        Ok(self.categories.read().await.clone())
    }
}
