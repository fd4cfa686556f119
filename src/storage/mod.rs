//! Record store for products and categories.
//!
//! Traits describe the store contract; `sql` implements it over SQLite or
//! PostgreSQL with sea-query built, parameter-bound statements; `mock` keeps
//! rows in memory for tests.

use std::sync::Arc;
use std::time::Duration;

use backon::Retryable;
use tracing::{info, warn};

use crate::config::{StorageConfig, StorageType};

mod category_store;
pub mod helpers;
pub mod mock;
mod product_store;
pub mod query;
pub mod schema;
pub mod sql;

pub use category_store::CategoryStore;
pub use product_store::ProductStore;
pub use query::{ListOrder, Page, PageError, ProductFilter, ProductListing};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Constraint violation: {0}")]
    Conflict(String),

    #[error("Invalid timestamp in row: {0}")]
    InvalidTimestamp(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Mock failure: {0}")]
    Mock(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StorageError::Conflict(db.message().to_string())
            }
            _ => StorageError::Database(err),
        }
    }
}

impl StorageError {
    /// True when the store rejected the write because of a uniqueness rule.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict(_))
    }
}

/// Product and category stores sharing one backend.
pub type Stores = (Arc<dyn ProductStore>, Arc<dyn CategoryStore>);

type InitResult = std::result::Result<Stores, Box<dyn std::error::Error>>;

/// Initialize storage based on configuration.
///
/// Connects (retrying with backoff while the database comes up), runs
/// migrations, and returns both stores over the same pool.
pub async fn init_storage(config: &StorageConfig) -> InitResult {
    match config.storage_type {
        StorageType::Sqlite => init_sqlite(config).await,
        StorageType::Postgres => init_postgres(config).await,
    }
}

#[cfg(feature = "sqlite")]
async fn init_sqlite(config: &StorageConfig) -> InitResult {
    let path = &config.sqlite.path;
    info!(storage = "sqlite", path = %path, "Initializing storage");

    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let url = format!("sqlite:{}?mode=rwc", path);
    let pool = (|| sqlx::SqlitePool::connect(&url))
        .retry(crate::utils::retry::connection_backoff())
        .notify(|err: &sqlx::Error, dur: Duration| {
            warn!(storage = "sqlite", error = %err, delay = ?dur, "Connection failed, retrying");
        })
        .await?;

    sql::sqlite::migrate(&pool).await?;

    let products: Arc<dyn ProductStore> =
        Arc::new(sql::sqlite::SqliteProductStore::new(pool.clone()));
    let categories: Arc<dyn CategoryStore> = Arc::new(sql::sqlite::SqliteCategoryStore::new(pool));
    Ok((products, categories))
}

#[cfg(not(feature = "sqlite"))]
async fn init_sqlite(_config: &StorageConfig) -> InitResult {
    Err("SQLite storage requested but 'sqlite' feature is not enabled".into())
}

#[cfg(feature = "postgres")]
async fn init_postgres(config: &StorageConfig) -> InitResult {
    use sqlx::postgres::PgPoolOptions;

    let uri = &config.postgres.uri;
    let max_connections = config.postgres.max_connections;
    info!(storage = "postgres", max_connections, "Initializing storage");

    let pool = (|| PgPoolOptions::new().max_connections(max_connections).connect(uri))
        .retry(crate::utils::retry::connection_backoff())
        .notify(|err: &sqlx::Error, dur: Duration| {
            warn!(storage = "postgres", error = %err, delay = ?dur, "Connection failed, retrying");
        })
        .await?;

    sql::postgres::migrate(&pool).await?;

    let products: Arc<dyn ProductStore> =
        Arc::new(sql::postgres::PostgresProductStore::new(pool.clone()));
    let categories: Arc<dyn CategoryStore> =
        Arc::new(sql::postgres::PostgresCategoryStore::new(pool));
    Ok((products, categories))
}

#[cfg(not(feature = "postgres"))]
async fn init_postgres(_config: &StorageConfig) -> InitResult {
    Err("PostgreSQL storage requested but 'postgres' feature is not enabled".into())
}
