use std::sync::Arc;

use chrono::Utc;
use diesel::prelude::*;
use log::debug;
use oneul_core::{HistoryError, KeyValueStore};

use super::model::CacheEntryDB;
use crate::db::{create_pool, get_connection, init, run_migrations, DbPool};
use crate::errors::StorageError;
use crate::schema::cache_entries::dsl::*;

/// [`KeyValueStore`] over the `cache_entries` table.
pub struct SqliteKeyValueStore {
    pool: Arc<DbPool>,
}

impl SqliteKeyValueStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        SqliteKeyValueStore { pool }
    }

    /// Initialise the database at `db_path`, apply migrations and open a pool.
    pub fn open(db_path: &str) -> Result<Self, StorageError> {
        init(db_path)?;
        let pool = create_pool(db_path)?;
        run_migrations(&pool)?;
        Ok(Self::new(pool))
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        let mut conn = get_connection(&self.pool)?;
        let value = cache_entries
            .filter(cache_key.eq(key))
            .select(cache_value)
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        let mut conn = get_connection(&self.pool)?;
        diesel::replace_into(cache_entries)
            .values(&CacheEntryDB {
                cache_key: key.to_string(),
                cache_value: value.to_string(),
                updated_at: Utc::now().to_rfc3339(),
            })
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), HistoryError> {
        let mut conn = get_connection(&self.pool)?;
        let deleted = diesel::delete(cache_entries.filter(cache_key.eq(key)))
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        debug!("Removed {} rows for '{}'", deleted, key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, HistoryError> {
        let mut conn = get_connection(&self.pool)?;
        // `_` and `%` in the prefix are LIKE wildcards, so re-check in Rust.
        let keys = cache_entries
            .filter(cache_key.like(format!("{}%", prefix)))
            .select(cache_key)
            .order(cache_key.asc())
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(keys.into_iter().filter(|k| k.starts_with(prefix)).collect())
    }
}
