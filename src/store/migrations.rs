//! Schema setup for the libSQL backend.
//!
//! Steps are applied in order and the count of applied steps is kept in
//! SQLite's `user_version` pragma. Append new steps; never edit old ones.

use libsql::Connection;
use tracing::info;

use crate::error::DatabaseError;

static SCHEMA_STEPS: &[&str] = &[
    // 1: key-value table for preferences and history
    "CREATE TABLE IF NOT EXISTS kv_store (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );",
];

/// Bring the schema up to date. Safe to call on every open.
pub async fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let applied = schema_version(conn).await?;

    for (version, sql) in (1..).zip(SCHEMA_STEPS).skip(applied as usize) {
        info!(version = version, "Applying schema step");
        conn.execute_batch(&format!(
            "BEGIN; {sql} PRAGMA user_version = {version}; COMMIT;"
        ))
        .await
        .map_err(|e| DatabaseError::Migration(format!("Schema step {version} failed: {e}")))?;
    }
    Ok(())
}

async fn schema_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query("PRAGMA user_version", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("Failed to read schema version: {e}")))?;
    match rows
        .next()
        .await
        .map_err(|e| DatabaseError::Migration(format!("Failed to read schema version: {e}")))?
    {
        Some(row) => row
            .get::<i64>(0)
            .map_err(|e| DatabaseError::Migration(format!("Bad schema version: {e}"))),
        None => Ok(0),
    }
}
