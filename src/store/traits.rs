//! `KeyValueStore` trait: the single async interface for persistence.

use async_trait::async_trait;

use crate::error::DatabaseError;

/// Backend-agnostic string-keyed store.
///
/// Values are opaque text. Typed encoding lives one layer up in
/// [`crate::preferences::PreferenceStore`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, DatabaseError>;

    /// Insert or overwrite the value under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError>;

    /// Delete `key`. Returns whether a value was present.
    async fn remove(&self, key: &str) -> Result<bool, DatabaseError>;
}
