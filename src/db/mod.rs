//! SQLite storage bootstrap.
//!
//! Opens connections, configures pragmas and applies schema migrations
//! before any application data is read or written. Also hosts small
//! conversion helpers shared by the repositories.

pub mod migrations;

use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::{error, info};

use crate::error::{HrisError, HrisResult};

/// Opens a SQLite database file and applies all pending migrations.
///
/// Parent directories are created when missing.
pub fn open_db(path: impl AsRef<Path>) -> HrisResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| HrisError::Database {
            message: format!("cannot create {}: {e}", parent.display()),
        })?;
    }

    let mut conn = Connection::open(path)?;
    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                path = %path.display(),
                duration_ms = started_at.elapsed().as_millis() as u64,
                "Database opened"
            );
            Ok(conn)
        }
        Err(err) => {
            error!(path = %path.display(), error = %err, "Database bootstrap failed");
            Err(err)
        }
    }
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> HrisResult<Connection> {
    let mut conn = Connection::open_in_memory()?;
    bootstrap_connection(&mut conn)?;
    Ok(conn)
}

/// The connection shared by request handlers and background tasks.
pub type SharedDb = Arc<Mutex<Connection>>;

/// Wraps a connection for sharing.
pub fn shared(conn: Connection) -> SharedDb {
    Arc::new(Mutex::new(conn))
}

/// Locks the shared connection, recovering from poisoning.
///
/// Never hold the guard across an `.await`.
pub fn lock(db: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    db.lock().unwrap_or_else(PoisonError::into_inner)
}

fn bootstrap_connection(conn: &mut Connection) -> HrisResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    migrations::apply_migrations(conn)?;
    Ok(())
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

/// Parses a TEXT money column.
pub(crate) fn decimal_from_sql(idx: usize, raw: &str) -> rusqlite::Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parses a TEXT enum column via `FromStr`.
pub(crate) fn enum_from_sql<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    T::from_str(raw).map_err(|message| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            message.into(),
        )
    })
}
