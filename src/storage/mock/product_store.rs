//! Mock ProductStore implementation for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::{NewProduct, Product, ProductUpdate};
use crate::storage::{helpers, ListOrder, Page, ProductListing, ProductStore, Result, StorageError};

/// In-memory product store.
///
/// Rows are kept in insertion order. Listings apply the same filter, order
/// and paging semantics as the SQL backends.
#[derive(Default)]
pub struct MockProductStore {
    products: RwLock<Vec<Product>>,
    next_id: RwLock<i64>,
    fail: RwLock<bool>,
    calls: AtomicUsize,
}

impl MockProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StorageError::Mock`.
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    /// Number of trait calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of stored rows.
    pub async fn stored(&self) -> Vec<Product> {
        self.products.read().await.clone()
    }

    async fn enter(&self, op: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail.read().await {
            return Err(StorageError::Mock(format!("{op} failed")));
        }
        Ok(())
    }
}

fn paged(rows: Vec<Product>, page: Page) -> Vec<Product> {
    rows.into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

#[async_trait]
impl ProductStore for MockProductStore {
    async fn create(&self, product: NewProduct) -> Result<Product> {
        self.enter("create").await?;
        let id = {
            let mut next_id = self.next_id.write().await;
            *next_id += 1;
            *next_id
        };
        let stored = Product {
            id,
            name: product.name,
            description: product.description,
            price: product.price,
            thumbnail: product.thumbnail,
            inventory: product.inventory,
            supplier_id: product.supplier_id,
            category_id: product.category_id,
            created_at: helpers::now(),
            brand: product.brand,
        };
        self.products.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: i64) -> Result<Option<Product>> {
        self.enter("get").await?;
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self, listing: &ProductListing) -> Result<Vec<Product>> {
        self.enter("list").await?;
        let mut rows: Vec<Product> = self
            .products
            .read()
            .await
            .iter()
            .filter(|p| listing.category.map_or(true, |c| p.category_id == c))
            .cloned()
            .collect();
        match listing.order {
            ListOrder::Insertion => {}
            ListOrder::Recency => rows.sort_by_key(|p| p.created_at),
            ListOrder::PriceAsc => rows.sort_by_key(|p| p.price),
            ListOrder::PriceDesc => rows.sort_by_key(|p| std::cmp::Reverse(p.price)),
        }
        Ok(paged(rows, listing.page))
    }

    async fn list_recommended(&self, page: Page) -> Result<Vec<Product>> {
        self.enter("list_recommended").await?;
        Ok(paged(self.products.read().await.clone(), page))
    }

    async fn list_by_supplier(&self, supplier_id: i64, page: Page) -> Result<Vec<Product>> {
        self.enter("list_by_supplier").await?;
        let rows = self
            .products
            .read()
            .await
            .iter()
            .filter(|p| p.supplier_id == supplier_id)
            .cloned()
            .collect();
        Ok(paged(rows, page))
    }

    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>> {
        self.enter("list_by_ids").await?;
        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn update(&self, update: ProductUpdate) -> Result<u64> {
        self.enter("update").await?;
        let mut products = self.products.write().await;
        match products
            .iter_mut()
            .find(|p| p.id == update.id && p.supplier_id == update.supplier_id)
        {
            Some(product) => {
                product.name = update.name;
                product.price = update.price;
                product.inventory = update.inventory;
                product.brand = update.brand;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64, supplier_id: i64) -> Result<u64> {
        self.enter("delete").await?;
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| !(p.id == id && p.supplier_id == supplier_id));
        Ok((before - products.len()) as u64)
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64> {
        self.enter("delete_by_id").await?;
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok((before - products.len()) as u64)
    }

    async fn decrement_inventory(&self, id: i64, count: i32) -> Result<u64> {
        self.enter("decrement_inventory").await?;
        let mut products = self.products.write().await;
        match products
            .iter_mut()
            .find(|p| p.id == id && p.inventory >= count)
        {
            Some(product) => {
                product.inventory -= count;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn increment_inventory(&self, id: i64, count: i32) -> Result<u64> {
        self.enter("increment_inventory").await?;
        let mut products = self.products.write().await;
        match products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                product.inventory += count;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn inventory(&self, id: i64) -> Result<Option<i32>> {
        self.enter("inventory").await?;
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).map(|p| p.inventory))
    }
}
