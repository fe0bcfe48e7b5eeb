//! Persistence layer: libSQL-backed key-value storage.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::KeyValueStore;
