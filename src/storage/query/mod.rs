//! Filtered query builder for product listings.
//!
//! Turns request sort flags and paging into sea-query statements. Values are
//! never spliced into SQL text; the backends bind them as parameters.

use sea_query::{Expr, Order, Query, SelectStatement};

use super::schema::{Products, PRODUCT_COLUMNS};

/// Sort flags as they arrive on a listing request.
///
/// The flags are meant to be mutually exclusive. When several are set the
/// first one in `by_recency`, `by_price_asc`, `by_price_desc` order wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub by_recency: bool,
    pub by_price_asc: bool,
    pub by_price_desc: bool,
}

impl ProductFilter {
    /// Resolve the flags to a single ordering.
    pub fn order(&self) -> ListOrder {
        if self.by_recency {
            ListOrder::Recency
        } else if self.by_price_asc {
            ListOrder::PriceAsc
        } else if self.by_price_desc {
            ListOrder::PriceDesc
        } else {
            ListOrder::Insertion
        }
    }
}

/// Row ordering of a product listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListOrder {
    /// No ORDER BY; rows come back in store order.
    #[default]
    Insertion,
    /// `created_at` ascending.
    Recency,
    PriceAsc,
    PriceDesc,
}

impl ListOrder {
    fn apply(self, stmt: &mut SelectStatement) {
        match self {
            ListOrder::Insertion => {}
            ListOrder::Recency => {
                stmt.order_by(Products::CreatedAt, Order::Asc);
            }
            ListOrder::PriceAsc => {
                stmt.order_by(Products::Price, Order::Asc);
            }
            ListOrder::PriceDesc => {
                stmt.order_by(Products::Price, Order::Desc);
            }
        }
    }
}

/// Paging request rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("limit must not be negative, got {0}")]
    NegativeLimit(i32),

    #[error("offset must not be negative, got {0}")]
    NegativeOffset(i32),
}

/// Validated limit/offset pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    /// Validate wire paging values. A zero limit selects `default_limit`.
    pub fn new(limit: i32, offset: i32, default_limit: u64) -> Result<Self, PageError> {
        if limit < 0 {
            return Err(PageError::NegativeLimit(limit));
        }
        if offset < 0 {
            return Err(PageError::NegativeOffset(offset));
        }
        let limit = if limit == 0 {
            default_limit
        } else {
            limit as u64
        };
        Ok(Self {
            limit,
            offset: offset as u64,
        })
    }

    fn apply(self, stmt: &mut SelectStatement) {
        stmt.limit(self.limit).offset(self.offset);
    }
}

/// A category-scoped (or catalog-wide), ordered, paged product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductListing {
    /// `None` lists across all categories.
    pub category: Option<i64>,
    pub page: Page,
    pub order: ListOrder,
}

impl ProductListing {
    pub fn new(category: Option<i64>, page: Page, filter: ProductFilter) -> Self {
        Self {
            category,
            page,
            order: filter.order(),
        }
    }

    /// Build the SELECT for this listing.
    pub fn select(&self) -> SelectStatement {
        let mut stmt = select_products();
        if let Some(category) = self.category {
            stmt.and_where(Expr::col(Products::CategoryId).eq(category));
        }
        self.order.apply(&mut stmt);
        self.page.apply(&mut stmt);
        stmt
    }
}

/// Base SELECT of every product column.
pub fn select_products() -> SelectStatement {
    Query::select()
        .columns(PRODUCT_COLUMNS)
        .from(Products::Table)
        .to_owned()
}

/// Unfiltered page of products.
pub fn recommended(page: Page) -> SelectStatement {
    let mut stmt = select_products();
    page.apply(&mut stmt);
    stmt
}

/// Page of products owned by one supplier.
pub fn by_supplier(supplier_id: i64, page: Page) -> SelectStatement {
    let mut stmt = select_products();
    stmt.and_where(Expr::col(Products::SupplierId).eq(supplier_id));
    page.apply(&mut stmt);
    stmt
}

/// Products whose id is in `ids`, one bound parameter per id.
pub fn by_ids(ids: &[i64]) -> SelectStatement {
    let mut stmt = select_products();
    stmt.and_where(Expr::col(Products::Id).is_in(ids.iter().copied()));
    stmt
}

/// Single product by id.
pub fn by_id(id: i64) -> SelectStatement {
    let mut stmt = select_products();
    stmt.and_where(Expr::col(Products::Id).eq(id));
    stmt
}
