//! Shared storage helper functions.
//!
//! Timestamp encoding and row decoding used by every SQL backend.
//! `created_at` is stored as fixed-width RFC 3339 UTC text so that
//! lexical order equals chronological order on every backend.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

use crate::model::{Category, Product};

use super::{Result, StorageError};

/// Current time at the precision the store keeps (microseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Encode a timestamp for storage.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a stored timestamp.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidTimestamp(format!("{raw}: {e}")))
}

/// Raw product row as read from any SQL backend.
#[derive(Debug, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub thumbnail: String,
    pub inventory: i32,
    pub supplier_id: i64,
    pub category_id: i64,
    pub created_at: String,
    pub brand: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StorageError;

    fn try_from(row: ProductRow) -> Result<Self> {
        Ok(Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            thumbnail: row.thumbnail,
            inventory: row.inventory,
            supplier_id: row.supplier_id,
            category_id: row.category_id,
            created_at: parse_timestamp(&row.created_at)?,
            brand: row.brand,
        })
    }
}

/// Raw category row as read from any SQL backend.
#[derive(Debug, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub thumbnail: Option<String>,
    pub created_at: String,
}

impl TryFrom<CategoryRow> for Category {
    type Error = StorageError;

    fn try_from(row: CategoryRow) -> Result<Self> {
        Ok(Category {
            id: row.id,
            name: row.name,
            thumbnail: row.thumbnail,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

/// Decode a batch of product rows, preserving order.
pub fn products_from_rows(rows: Vec<ProductRow>) -> Result<Vec<Product>> {
    rows.into_iter().map(Product::try_from).collect()
}
