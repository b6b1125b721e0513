//! SQLite storage for oneul.
//!
//! Implements the `KeyValueStore` trait from `oneul-core` on a single
//! `cache_entries` table, using Diesel with an r2d2 pool and embedded
//! migrations. Both the day cache and the translation cache live here.

pub mod db;
pub mod errors;
pub mod kv;
pub mod schema;

pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool};
pub use errors::StorageError;
pub use kv::SqliteKeyValueStore;
