use anyhow::{Context, Result};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::db::repositories::DBPool;

/// Builds the shared connection pool from the database settings.
///
/// The pool opens its first connection eagerly, so bad credentials or an
/// unreachable host fail here rather than on the first query.
pub fn connect(config: &DatabaseConfig) -> Result<Arc<DBPool>> {
    info!(
        host = %config.host,
        database = %config.name,
        max_connections = config.max_connections,
        "Setting up database connection pool..."
    );
    let manager = ConnectionManager::<PgConnection>::new(config.connection_string());
    let pool = Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.connection_timeout_secs))
        .build(manager)
        .context("Failed to create database connection pool")?;
    info!("Database pool created successfully.");
    Ok(Arc::new(pool))
}
