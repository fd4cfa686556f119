//! Unified SQL ProductStore implementation.
//!
//! Uses a macro to generate implementations for each SQL backend,
//! eliminating code duplication while maintaining type safety.

use std::marker::PhantomData;

use super::SqlDatabase;

/// SQL-based implementation of ProductStore.
///
/// This generic implementation works with any SQL database that implements
/// the `SqlDatabase` trait (PostgreSQL, SQLite).
pub struct SqlProductStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlProductStore<DB> {
    /// Create a new SQL product store with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }
}

/// Macro to implement ProductStore for a specific SQL backend.
macro_rules! impl_product_store {
    ($db_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::storage::ProductStore for SqlProductStore<$db_type> {
            async fn create(
                &self,
                product: crate::model::NewProduct,
            ) -> crate::storage::Result<crate::model::Product> {
                use sea_query::Query;

                use crate::storage::helpers;
                use crate::storage::schema::Products;

                let created_at = helpers::now();

                let stmt = Query::insert()
                    .into_table(Products::Table)
                    .columns([
                        Products::Name,
                        Products::Description,
                        Products::Price,
                        Products::Thumbnail,
                        Products::Inventory,
                        Products::SupplierId,
                        Products::CategoryId,
                        Products::CreatedAt,
                        Products::Brand,
                    ])
                    .values_panic([
                        product.name.clone().into(),
                        product.description.clone().into(),
                        product.price.into(),
                        product.thumbnail.clone().into(),
                        product.inventory.into(),
                        product.supplier_id.into(),
                        product.category_id.into(),
                        helpers::format_timestamp(&created_at).into(),
                        product.brand.clone().into(),
                    ])
                    .returning_col(Products::Id)
                    .to_owned();

                let (sql, values) = <$db_type>::build(&stmt);
                let (id,): (i64,) = sqlx::query_as_with(&sql, values)
                    .fetch_one(&self.pool)
                    .await?;

                Ok(crate::model::Product {
                    id,
                    name: product.name,
                    description: product.description,
                    price: product.price,
                    thumbnail: product.thumbnail,
                    inventory: product.inventory,
                    supplier_id: product.supplier_id,
                    category_id: product.category_id,
                    created_at,
                    brand: product.brand,
                })
            }

            async fn get(
                &self,
                id: i64,
            ) -> crate::storage::Result<Option<crate::model::Product>> {
                use crate::storage::helpers::ProductRow;
                use crate::storage::query;

                let (sql, values) = <$db_type>::build(&query::by_id(id));
                let row: Option<ProductRow> = sqlx::query_as_with(&sql, values)
                    .fetch_optional(&self.pool)
                    .await?;

                row.map(crate::model::Product::try_from).transpose()
            }

            async fn list(
                &self,
                listing: &crate::storage::ProductListing,
            ) -> crate::storage::Result<Vec<crate::model::Product>> {
                use crate::storage::helpers::{self, ProductRow};

                let (sql, values) = <$db_type>::build(&listing.select());
                let rows: Vec<ProductRow> = sqlx::query_as_with(&sql, values)
                    .fetch_all(&self.pool)
                    .await?;

                helpers::products_from_rows(rows)
            }

            async fn list_recommended(
                &self,
                page: crate::storage::Page,
            ) -> crate::storage::Result<Vec<crate::model::Product>> {
                use crate::storage::helpers::{self, ProductRow};
                use crate::storage::query;

                let (sql, values) = <$db_type>::build(&query::recommended(page));
                let rows: Vec<ProductRow> = sqlx::query_as_with(&sql, values)
                    .fetch_all(&self.pool)
                    .await?;

                helpers::products_from_rows(rows)
            }

            async fn list_by_supplier(
                &self,
                supplier_id: i64,
                page: crate::storage::Page,
            ) -> crate::storage::Result<Vec<crate::model::Product>> {
                use crate::storage::helpers::{self, ProductRow};
                use crate::storage::query;

                let (sql, values) = <$db_type>::build(&query::by_supplier(supplier_id, page));
                let rows: Vec<ProductRow> = sqlx::query_as_with(&sql, values)
                    .fetch_all(&self.pool)
                    .await?;

                helpers::products_from_rows(rows)
            }

            async fn list_by_ids(
                &self,
                ids: &[i64],
            ) -> crate::storage::Result<Vec<crate::model::Product>> {
                use crate::storage::helpers::{self, ProductRow};
                use crate::storage::query;

                if ids.is_empty() {
                    return Ok(Vec::new());
                }

                let (sql, values) = <$db_type>::build(&query::by_ids(ids));
                let rows: Vec<ProductRow> = sqlx::query_as_with(&sql, values)
                    .fetch_all(&self.pool)
                    .await?;

                helpers::products_from_rows(rows)
            }

            async fn update(
                &self,
                update: crate::model::ProductUpdate,
            ) -> crate::storage::Result<u64> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::Products;

                let stmt = Query::update()
                    .table(Products::Table)
                    .value(Products::Name, update.name)
                    .value(Products::Price, update.price)
                    .value(Products::Inventory, update.inventory)
                    .value(Products::Brand, update.brand)
                    .and_where(Expr::col(Products::Id).eq(update.id))
                    .and_where(Expr::col(Products::SupplierId).eq(update.supplier_id))
                    .to_owned();

                let (sql, values) = <$db_type>::build(&stmt);
                let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;

                Ok(result.rows_affected())
            }

            async fn delete(&self, id: i64, supplier_id: i64) -> crate::storage::Result<u64> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::Products;

                let stmt = Query::delete()
                    .from_table(Products::Table)
                    .and_where(Expr::col(Products::Id).eq(id))
                    .and_where(Expr::col(Products::SupplierId).eq(supplier_id))
                    .to_owned();

                let (sql, values) = <$db_type>::build(&stmt);
                let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;

                Ok(result.rows_affected())
            }

            async fn delete_by_id(&self, id: i64) -> crate::storage::Result<u64> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::Products;

                let stmt = Query::delete()
                    .from_table(Products::Table)
                    .and_where(Expr::col(Products::Id).eq(id))
                    .to_owned();

                let (sql, values) = <$db_type>::build(&stmt);
                let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;

                Ok(result.rows_affected())
            }

            async fn decrement_inventory(
                &self,
                id: i64,
                count: i32,
            ) -> crate::storage::Result<u64> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::Products;

                let stmt = Query::update()
                    .table(Products::Table)
                    .value(Products::Inventory, Expr::col(Products::Inventory).sub(count))
                    .and_where(Expr::col(Products::Id).eq(id))
                    .and_where(Expr::col(Products::Inventory).gte(count))
                    .to_owned();

                let (sql, values) = <$db_type>::build(&stmt);
                let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;

                Ok(result.rows_affected())
            }

            async fn increment_inventory(
                &self,
                id: i64,
                count: i32,
            ) -> crate::storage::Result<u64> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::Products;

                let stmt = Query::update()
                    .table(Products::Table)
                    .value(Products::Inventory, Expr::col(Products::Inventory).add(count))
                    .and_where(Expr::col(Products::Id).eq(id))
                    .to_owned();

                let (sql, values) = <$db_type>::build(&stmt);
                let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;

                Ok(result.rows_affected())
            }

            async fn inventory(&self, id: i64) -> crate::storage::Result<Option<i32>> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::Products;

                let stmt = Query::select()
                    .column(Products::Inventory)
                    .from(Products::Table)
                    .and_where(Expr::col(Products::Id).eq(id))
                    .to_owned();

                let (sql, values) = <$db_type>::build(&stmt);
                let row: Option<(i32,)> = sqlx::query_as_with(&sql, values)
                    .fetch_optional(&self.pool)
                    .await?;

                Ok(row.map(|(inventory,)| inventory))
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_product_store!(super::postgres::Postgres, "postgres");
impl_product_store!(super::sqlite::Sqlite, "sqlite");
