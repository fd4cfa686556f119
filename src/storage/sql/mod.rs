//! Unified SQL storage implementations.
//!
//! This module provides shared implementations for SQL-based storage backends
//! (PostgreSQL, SQLite). The implementations are parameterized by database type
//! using the `SqlDatabase` trait.

mod category_store;
mod product_store;
mod query;

pub use category_store::SqlCategoryStore;
pub use product_store::SqlProductStore;
pub use query::SqlDatabase;

#[cfg(feature = "postgres")]
pub mod postgres {
    //! PostgreSQL database backend.

    use sea_query::PostgresQueryBuilder;
    use sea_query_binder::{SqlxBinder, SqlxValues};
    use sqlx::PgPool;

    /// PostgreSQL database marker type.
    pub struct Postgres;

    impl super::SqlDatabase for Postgres {
        type Pool = PgPool;

        fn build<S: SqlxBinder>(stmt: &S) -> (String, SqlxValues) {
            stmt.build_sqlx(PostgresQueryBuilder)
        }
    }

    /// Apply the PostgreSQL schema migrations.
    pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations/postgres").run(pool).await
    }

    /// PostgreSQL product store.
    pub type PostgresProductStore = super::SqlProductStore<Postgres>;

    /// PostgreSQL category store.
    pub type PostgresCategoryStore = super::SqlCategoryStore<Postgres>;
}

#[cfg(feature = "sqlite")]
pub mod sqlite {
    //! SQLite database backend.

    use sea_query::SqliteQueryBuilder;
    use sea_query_binder::{SqlxBinder, SqlxValues};
    use sqlx::SqlitePool;

    /// SQLite database marker type.
    pub struct Sqlite;

    impl super::SqlDatabase for Sqlite {
        type Pool = SqlitePool;

        fn build<S: SqlxBinder>(stmt: &S) -> (String, SqlxValues) {
            stmt.build_sqlx(SqliteQueryBuilder)
        }
    }

    /// Apply the SQLite schema migrations.
    pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations/sqlite").run(pool).await
    }

    /// SQLite product store.
    pub type SqliteProductStore = super::SqlProductStore<Sqlite>;

    /// SQLite category store.
    pub type SqliteCategoryStore = super::SqlCategoryStore<Sqlite>;
}
