//! SQL database abstraction trait.

use sea_query_binder::{SqlxBinder, SqlxValues};

/// Trait for SQL database backends.
///
/// This trait abstracts over different SQL databases (PostgreSQL, SQLite)
/// by providing the pool type and the dialect used to render statements.
pub trait SqlDatabase: Send + Sync + 'static {
    /// The connection pool type for this database.
    type Pool: Clone + Send + Sync;

    /// Render a sea-query statement to SQL text plus its bound values.
    fn build<S: SqlxBinder>(stmt: &S) -> (String, SqlxValues);
}
