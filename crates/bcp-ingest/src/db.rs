//! Database pool construction

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Build the PostgreSQL connection pool from validated configuration.
///
/// The acquire timeout bounds how long the pipeline can block waiting for a
/// connection; a dead database fails the run quickly instead of hanging.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url())
        .await?;

    info!(
        host = %config.host,
        port = config.port,
        database = %config.name,
        "Connected to database"
    );

    Ok(pool)
}
