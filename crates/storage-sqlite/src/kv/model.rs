use diesel::prelude::*;

/// One row of the key-value cache table.
#[derive(Queryable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::cache_entries)]
pub struct CacheEntryDB {
    pub cache_key: String,
    pub cache_value: String,
    pub updated_at: String,
}
