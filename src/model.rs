//! Catalog records.
//!
//! Rows owned by the record store, the inputs used to create or change them,
//! and the request-scoped enriched view returned to clients.

use chrono::{DateTime, Utc};

/// A stored product row.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Price in minor currency units.
    pub price: i64,
    pub thumbnail: String,
    pub inventory: i32,
    pub supplier_id: i64,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub brand: Option<String>,
}

/// Fields required to insert a product.
///
/// The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub thumbnail: String,
    pub inventory: i32,
    pub supplier_id: i64,
    pub category_id: i64,
    pub brand: Option<String>,
}

/// Replacement values for a product, scoped to `(id, supplier_id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub id: i64,
    pub supplier_id: i64,
    pub name: String,
    pub price: i64,
    pub inventory: i32,
    pub brand: Option<String>,
}

/// A stored category row.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to insert a category. The id is chosen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub id: i64,
    pub name: String,
    pub thumbnail: Option<String>,
}

/// A product plus fields derived from peer data at read time.
///
/// Lives only for the duration of one request; never cached or persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedProduct {
    pub product: Product,
    /// Mean of the strictly positive star ratings, 0 when there are none.
    pub star_average: f32,
    /// Units sold as reported by the order service, 0 when unavailable.
    pub total_sold: i64,
}

impl EnrichedProduct {
    /// Wrap a product with zeroed derived fields.
    pub fn bare(product: Product) -> Self {
        Self {
            product,
            star_average: 0.0,
            total_sold: 0,
        }
    }
}
