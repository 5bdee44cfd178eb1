//! Application state for the HRIS API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::{SharedDb, lock};
use crate::error::HrisResult;
use crate::models::Actor;
use crate::psgc::PsgcCache;

/// Header naming the user performing a request.
pub const ACTOR_HEADER: &str = "x-hris-user";

/// Shared application state.
///
/// Contains resources that are shared across all request handlers: the
/// database connection, the loaded configuration and the PSGC cache.
#[derive(Clone)]
pub struct AppState {
    db: SharedDb,
    config: Arc<AppConfig>,
    psgc: Arc<PsgcCache>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(db: SharedDb, config: AppConfig, psgc: PsgcCache) -> Self {
        Self {
            db,
            config: Arc::new(config),
            psgc: Arc::new(psgc),
        }
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the shared database handle.
    pub fn db(&self) -> &SharedDb {
        &self.db
    }

    /// Returns the PSGC cache.
    pub fn psgc(&self) -> &PsgcCache {
        &self.psgc
    }

    /// Runs `f` with the database locked.
    pub fn with_db<T>(&self, f: impl FnOnce(&Connection) -> HrisResult<T>) -> HrisResult<T> {
        let conn = lock(&self.db);
        f(&conn)
    }

    /// Current company-local time.
    pub fn now(&self) -> NaiveDateTime {
        Utc::now()
            .with_timezone(&self.config.server.timezone())
            .naive_local()
    }

    /// Current company-local date.
    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// The actor for a request, from the `X-HRIS-User` header.
    pub fn actor(&self, headers: &HeaderMap) -> Actor {
        let user = headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        Actor::new(user, self.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open_db_in_memory, shared};
    use crate::models::SYSTEM_ACTOR;
    use crate::psgc::HttpPsgcSource;
    use axum::http::HeaderValue;

    fn state() -> AppState {
        let config = AppConfig::default();
        let source = HttpPsgcSource::new(&config.psgc).unwrap();
        let psgc = PsgcCache::new(Arc::new(source), &config.psgc);
        AppState::new(shared(open_db_in_memory().unwrap()), config, psgc)
    }

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_actor_defaults_to_system() {
        assert_eq!(state().actor(&HeaderMap::new()).user, SYSTEM_ACTOR);
    }

    #[test]
    fn test_actor_read_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(ACTOR_HEADER, HeaderValue::from_static("hr.admin"));
        assert_eq!(state().actor(&headers).user, "hr.admin");
    }
}
