//! Unified SQL CategoryStore implementation.

use std::marker::PhantomData;

use super::SqlDatabase;

/// SQL-based implementation of CategoryStore.
pub struct SqlCategoryStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlCategoryStore<DB> {
    /// Create a new SQL category store with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }
}

macro_rules! impl_category_store {
    ($db_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::storage::CategoryStore for SqlCategoryStore<$db_type> {
            async fn create(
                &self,
                category: crate::model::NewCategory,
            ) -> crate::storage::Result<crate::model::Category> {
                use sea_query::Query;

                use crate::storage::helpers;
                use crate::storage::schema::Categories;

                let created_at = helpers::now();

                let stmt = Query::insert()
                    .into_table(Categories::Table)
                    .columns([
                        Categories::Id,
                        Categories::Name,
                        Categories::Thumbnail,
                        Categories::CreatedAt,
                    ])
                    .values_panic([
                        category.id.into(),
                        category.name.clone().into(),
                        category.thumbnail.clone().into(),
                        helpers::format_timestamp(&created_at).into(),
                    ])
                    .to_owned();

                let (sql, values) = <$db_type>::build(&stmt);
                sqlx::query_with(&sql, values).execute(&self.pool).await?;

                Ok(crate::model::Category {
                    id: category.id,
                    name: category.name,
                    thumbnail: category.thumbnail,
                    created_at,
                })
            }

            async fn list(&self) -> crate::storage::Result<Vec<crate::model::Category>> {
                use sea_query::Query;

                use crate::storage::helpers::CategoryRow;
                use crate::storage::schema::{Categories, CATEGORY_COLUMNS};

                let stmt = Query::select()
                    .columns(CATEGORY_COLUMNS)
                    .from(Categories::Table)
                    .to_owned();

                let (sql, values) = <$db_type>::build(&stmt);
                let rows: Vec<CategoryRow> = sqlx::query_as_with(&sql, values)
                    .fetch_all(&self.pool)
                    .await?;

                rows.into_iter().map(crate::model::Category::try_from).collect()
            }
        }
    };
}

impl_category_store!(super::postgres::Postgres, "postgres");
impl_category_store!(super::sqlite::Sqlite, "sqlite");
