//! PSGC cache table access.

use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value as JsonValue;

use crate::error::HrisResult;

/// A cached PSGC response.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPayload {
    /// The stored JSON.
    pub payload: JsonValue,
    /// When it was fetched, in UTC.
    pub fetched_at: NaiveDateTime,
}

/// SQLite-backed PSGC cache table.
pub struct PsgcCacheRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> PsgcCacheRepository<'conn> {
    /// Creates a repository over the given connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Reads a cached payload regardless of age.
    pub fn get(&self, cache_key: &str) -> HrisResult<Option<CachedPayload>> {
        let row = self
            .conn
            .query_row(
                "SELECT payload, fetched_at FROM psgc_cache WHERE cache_key = ?1;",
                params![cache_key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, NaiveDateTime>(1)?)),
            )
            .optional()?;

        match row {
            Some((raw, fetched_at)) => Ok(Some(CachedPayload {
                payload: serde_json::from_str(&raw)?,
                fetched_at,
            })),
            None => Ok(None),
        }
    }

    /// Stores or replaces a payload.
    pub fn put(
        &self,
        cache_key: &str,
        payload: &JsonValue,
        fetched_at: NaiveDateTime,
    ) -> HrisResult<()> {
        self.conn.execute(
            "INSERT INTO psgc_cache (cache_key, payload, fetched_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(cache_key) DO UPDATE SET
                payload = excluded.payload,
                fetched_at = excluded.fetched_at;",
            params![cache_key, payload.to_string(), fetched_at],
        )?;
        Ok(())
    }

    /// Deletes rows whose key starts with `prefix` (all rows when `None`).
    pub fn clear(&self, prefix: Option<&str>) -> HrisResult<usize> {
        let removed = match prefix {
            Some(prefix) => self.conn.execute(
                "DELETE FROM psgc_cache WHERE substr(cache_key, 1, length(?1)) = ?1;",
                params![prefix],
            )?,
            None => self.conn.execute("DELETE FROM psgc_cache;", [])?,
        };
        Ok(removed)
    }
}
