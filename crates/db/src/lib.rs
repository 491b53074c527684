//! Persistence layer: models, repositories, migrations, the show tree
//! writer/deleter and the list pipeline compiler.

use sqlx::postgres::PgPoolOptions;
use sqlx::{Postgres, Transaction};

pub mod bulk;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod repositories;
pub mod tree;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Finish a transaction according to the outcome of the work done in it.
///
/// Commits on `Ok`. On `Err` the transaction is rolled back and the original
/// error is returned; a failed rollback is only logged, since the connection
/// discards the transaction when it is dropped anyway.
pub async fn commit_or_rollback<T, E>(
    tx: Transaction<'_, Postgres>,
    result: Result<T, E>,
) -> Result<T, E>
where
    E: From<sqlx::Error>,
{
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "Transaction rollback failed");
            }
            Err(err)
        }
    }
}
