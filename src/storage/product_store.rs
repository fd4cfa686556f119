//! ProductStore trait definition.

use async_trait::async_trait;

use super::query::{Page, ProductListing};
use super::Result;
use crate::model::{NewProduct, Product, ProductUpdate};

/// Interface for product persistence.
///
/// List operations return rows in store order; callers must not reorder
/// them. Scoped writes report the number of affected rows so callers can
/// tell "no such row for this owner" apart from success.
///
/// Implementations:
/// - `SqliteProductStore`: SQLite storage
/// - `PostgresProductStore`: PostgreSQL storage
/// - `MockProductStore`: In-memory mock for testing
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a product, returning the stored row with its assigned id.
    async fn create(&self, product: NewProduct) -> Result<Product>;

    /// Fetch one product by id.
    async fn get(&self, id: i64) -> Result<Option<Product>>;

    /// List products for a filtered, ordered, paged listing.
    async fn list(&self, listing: &ProductListing) -> Result<Vec<Product>>;

    /// Unfiltered page of products.
    async fn list_recommended(&self, page: Page) -> Result<Vec<Product>>;

    /// Page of products owned by a supplier.
    async fn list_by_supplier(&self, supplier_id: i64, page: Page) -> Result<Vec<Product>>;

    /// Products whose ids are in `ids`. Each id is bound as a parameter.
    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>>;

    /// Replace name, price, inventory and brand where `(id, supplier_id)`
    /// matches. Returns rows affected.
    async fn update(&self, update: ProductUpdate) -> Result<u64>;

    /// Delete where `(id, supplier_id)` matches. Returns rows affected.
    async fn delete(&self, id: i64, supplier_id: i64) -> Result<u64>;

    /// Delete by id regardless of owner. Returns rows affected.
    async fn delete_by_id(&self, id: i64) -> Result<u64>;

    /// Subtract `count` from inventory only when `inventory >= count`.
    /// Returns rows affected; 0 means missing product or insufficient stock.
    async fn decrement_inventory(&self, id: i64, count: i32) -> Result<u64>;

    /// Add `count` to inventory. Returns rows affected.
    async fn increment_inventory(&self, id: i64, count: i32) -> Result<u64>;

    /// Current inventory of a product.
    async fn inventory(&self, id: i64) -> Result<Option<i32>>;
}
