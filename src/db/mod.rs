//! PostgreSQL access.
//!
//! Query functions take any `PgExecutor`, so handlers can run them on the
//! pool or inside a transaction (`&mut *tx`). Multi-statement writes always go
//! through `pool.begin()` and `commit()`; a transaction dropped before commit
//! is rolled back.

pub mod events;
pub mod lookups;
pub mod organizers;
pub mod permissions;
pub mod spaces;
pub mod templates;
pub mod users;
pub mod venues;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgExecutor, PgPool};

use crate::config::Config;
use crate::sql::UpdateBuilder;
use crate::utils::error::{AppError, AppResult};

const ACQUIRE_TIMEOUT_SECS: u64 = 10;

fn pool_options(config: &Config) -> PgPoolOptions {
    let search_path = format!("SET search_path TO {}, public", quote_ident(&config.db_schema));
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
        .after_connect(move |conn, _meta| {
            let search_path = search_path.clone();
            Box::pin(async move {
                conn.execute(search_path.as_str()).await?;
                Ok(())
            })
        })
}

pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    pool_options(config).connect(&config.database_url).await
}

/// A pool that connects on first use.
pub fn create_lazy_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    pool_options(config).connect_lazy(&config.database_url)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}

/// Double-quoted SQL identifier.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Runs a partial update; an empty builder is a validation error and a
/// missing row is reported as not found.
pub async fn apply_update(
    executor: impl PgExecutor<'_>,
    builder: UpdateBuilder,
    table: &str,
    id: i32,
    label: &str,
) -> AppResult<()> {
    let (sql, args) = builder
        .build(table, "id", id)
        .ok_or_else(|| AppError::validation("no fields to update"))?;

    let result = sqlx::query_with(&sql, args).execute(executor).await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("{} not found", label)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("uranus"), "\"uranus\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
