//! libSQL backend: async `KeyValueStore` implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, params};
use tracing::info;

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::KeyValueStore;

/// libSQL key-value backend over one reused connection.
pub struct LibSqlBackend {
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file, creating parent directories.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }
        let backend = Self::open(path).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Private in-memory database, used by tests.
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        Self::open(Path::new(":memory:")).await
    }

    async fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = libsql::Builder::new_local(path)
            .build()
            .await
            .and_then(|db| db.connect())
            .map_err(|e| DatabaseError::Pool(format!("Failed to open {}: {e}", path.display())))?;
        migrations::run_migrations(&conn).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueStore for LibSqlBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .conn
            .query("SELECT value FROM kv_store WHERE key = ?1", params![key])
            .await
            .map_err(|e| DatabaseError::Query(format!("get: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value: String = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("get: {e}")))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get: {e}"))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (key) DO UPDATE SET value = ?2, updated_at = ?3",
                params![key, value, now],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("set: {e}")))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, DatabaseError> {
        let count = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .await
            .map_err(|e| DatabaseError::Query(format!("remove: {e}")))?;
        Ok(count > 0)
    }
}
