//! Read-through cache in front of the PSGC API.
//!
//! Payloads are stored in the `psgc_cache` table keyed by resource. Fresh
//! rows are served without touching upstream; expired rows are refetched
//! within the request budget, and served stale when upstream is down or the
//! budget is spent.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{Duration, NaiveDateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::config::PsgcConfig;
use crate::db::lock;
use crate::error::{HrisError, HrisResult};
use crate::models::is_psgc_code;
use crate::repo::PsgcCacheRepository;

use super::client::PsgcSource;
use super::encoding::fix_json;
use super::rate_counter::RateCounter;
use super::region_match::{Region, match_region};

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// Fresh cache row.
    Hit,
    /// Fetched from upstream just now.
    Miss,
    /// Expired cache row served because upstream was unavailable.
    Stale,
}

impl CacheStatus {
    /// Lowercase name, as sent in the `X-Cache` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Stale => "stale",
        }
    }
}

/// A PSGC payload with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    /// The JSON document.
    pub data: JsonValue,
    /// Hit, miss or stale.
    pub status: CacheStatus,
    /// When the payload was fetched from upstream, in UTC.
    pub fetched_at: NaiveDateTime,
}

/// The PSGC read-through cache.
pub struct PsgcCache {
    source: Arc<dyn PsgcSource>,
    ttl: Duration,
    counter: RateCounter,
}

impl PsgcCache {
    /// Creates a cache over `source` with the configured TTL and budget.
    pub fn new(source: Arc<dyn PsgcSource>, config: &PsgcConfig) -> Self {
        Self {
            source,
            ttl: Duration::hours(i64::from(config.cache_ttl_hours)),
            counter: RateCounter::per_minute(config.max_requests_per_minute),
        }
    }

    /// Returns the payload for `cache_key`, fetching `path` upstream when needed.
    ///
    /// # Returns
    ///
    /// - `Hit` when a row younger than the TTL exists
    /// - `Miss` after a successful upstream fetch (stored with strings repaired)
    /// - `Stale` when the fetch failed or the budget is spent but an old row exists
    ///
    /// Without any cached row, the upstream error (or `RateLimited`) is returned.
    pub async fn get_cached_or_fetch(
        &self,
        db: &Mutex<Connection>,
        cache_key: &str,
        path: &str,
    ) -> HrisResult<CachedResponse> {
        let cached = {
            let conn = lock(db);
            PsgcCacheRepository::new(&conn).get(cache_key)?
        };
        let now = Utc::now().naive_utc();

        if let Some(row) = &cached {
            if now - row.fetched_at < self.ttl {
                debug!(cache_key = %cache_key, "PSGC cache hit");
                return Ok(CachedResponse {
                    data: row.payload.clone(),
                    status: CacheStatus::Hit,
                    fetched_at: row.fetched_at,
                });
            }
        }

        if !self.counter.try_acquire() {
            warn!(
                cache_key = %cache_key,
                limit = self.counter.limit(),
                "PSGC request budget exhausted"
            );
            return match cached {
                Some(row) => Ok(stale(row.payload, row.fetched_at)),
                None => Err(HrisError::RateLimited {
                    limit: self.counter.limit(),
                }),
            };
        }

        let started_at = Instant::now();
        match self.source.fetch(path).await {
            Ok(mut data) => {
                fix_json(&mut data);
                {
                    let conn = lock(db);
                    PsgcCacheRepository::new(&conn).put(cache_key, &data, now)?;
                }
                info!(
                    cache_key = %cache_key,
                    duration_us = started_at.elapsed().as_micros() as u64,
                    "PSGC resource fetched"
                );
                Ok(CachedResponse {
                    data,
                    status: CacheStatus::Miss,
                    fetched_at: now,
                })
            }
            Err(err) => match cached {
                Some(row) => {
                    warn!(
                        cache_key = %cache_key,
                        error = %err,
                        "PSGC fetch failed, serving stale payload"
                    );
                    Ok(stale(row.payload, row.fetched_at))
                }
                None => Err(err),
            },
        }
    }

    /// Drops cached rows whose key starts with `prefix`, or all rows.
    pub fn clear(&self, db: &Mutex<Connection>, prefix: Option<&str>) -> HrisResult<usize> {
        let removed = PsgcCacheRepository::new(&lock(db)).clear(prefix)?;
        info!(prefix = ?prefix, removed, "PSGC cache cleared");
        Ok(removed)
    }

    /// All regions.
    pub async fn regions(&self, db: &Mutex<Connection>) -> HrisResult<CachedResponse> {
        self.get_cached_or_fetch(db, "regions", "regions.json").await
    }

    /// Provinces of a region.
    pub async fn provinces_of_region(
        &self,
        db: &Mutex<Connection>,
        region_code: &str,
    ) -> HrisResult<CachedResponse> {
        let code = checked_code("region_code", region_code)?;
        self.get_cached_or_fetch(
            db,
            &format!("regions/{code}/provinces"),
            &format!("regions/{code}/provinces.json"),
        )
        .await
    }

    /// Cities and municipalities of a region.
    pub async fn cities_of_region(
        &self,
        db: &Mutex<Connection>,
        region_code: &str,
    ) -> HrisResult<CachedResponse> {
        let code = checked_code("region_code", region_code)?;
        self.get_cached_or_fetch(
            db,
            &format!("regions/{code}/cities-municipalities"),
            &format!("regions/{code}/cities-municipalities.json"),
        )
        .await
    }

    /// Cities and municipalities of a province.
    pub async fn cities_of_province(
        &self,
        db: &Mutex<Connection>,
        province_code: &str,
    ) -> HrisResult<CachedResponse> {
        let code = checked_code("province_code", province_code)?;
        self.get_cached_or_fetch(
            db,
            &format!("provinces/{code}/cities-municipalities"),
            &format!("provinces/{code}/cities-municipalities.json"),
        )
        .await
    }

    /// Barangays of a city or municipality.
    pub async fn barangays_of_city(
        &self,
        db: &Mutex<Connection>,
        city_code: &str,
    ) -> HrisResult<CachedResponse> {
        let code = checked_code("city_code", city_code)?;
        self.get_cached_or_fetch(
            db,
            &format!("cities-municipalities/{code}/barangays"),
            &format!("cities-municipalities/{code}/barangays.json"),
        )
        .await
    }

    /// Resolves a free-text region name against the cached region list.
    pub async fn resolve_region(&self, db: &Mutex<Connection>, name: &str) -> HrisResult<Region> {
        let response = self.regions(db).await?;
        let regions: Vec<Region> =
            serde_json::from_value(response.data).map_err(|e| HrisError::Upstream {
                message: format!("unexpected region list shape: {e}"),
            })?;
        match_region(name, &regions)
            .cloned()
            .ok_or_else(|| HrisError::not_found("region", name.trim()))
    }
}

fn stale(data: JsonValue, fetched_at: NaiveDateTime) -> CachedResponse {
    CachedResponse {
        data,
        status: CacheStatus::Stale,
        fetched_at,
    }
}

fn checked_code<'a>(field: &str, code: &'a str) -> HrisResult<&'a str> {
    let code = code.trim();
    if is_psgc_code(code) {
        Ok(code)
    } else {
        Err(HrisError::validation(
            field,
            format!("'{code}' is not a 9 or 10 digit PSGC code"),
        ))
    }
}
