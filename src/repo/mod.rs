//! SQLite repositories, one per table.
//!
//! Repositories borrow a connection (or a transaction, which derefs to one)
//! and keep SQL inside the persistence boundary. Write paths validate
//! their input before touching the database; read paths skip soft-deleted
//! rows unless asked otherwise.

mod attendance_repo;
mod employee_repo;
mod face_repo;
mod org_unit_repo;
mod position_repo;
mod psgc_cache_repo;
mod wage_rate_repo;

pub use attendance_repo::{AttendanceQuery, AttendanceRepository, NewAttendance};
pub use employee_repo::{EmployeeQuery, EmployeeRepository};
pub use face_repo::FaceRepository;
pub use org_unit_repo::OrgUnitRepository;
pub use position_repo::{PositionQuery, PositionRepository};
pub use psgc_cache_repo::{CachedPayload, PsgcCacheRepository};
pub use wage_rate_repo::{WageRateQuery, WageRateRepository};

use rusqlite::{Connection, Row, params};

use crate::error::{HrisError, HrisResult};
use crate::models::AuditInfo;

/// Default page size for list queries.
pub const DEFAULT_LIMIT: u32 = 100;
/// Upper bound on page size for list queries.
pub const MAX_LIMIT: u32 = 500;

/// Reads `is_deleted` followed by the five audit columns starting at `start`.
pub(crate) fn audit_from_row(row: &Row<'_>, start: usize) -> rusqlite::Result<(bool, AuditInfo)> {
    let is_deleted: i64 = row.get(start)?;
    Ok((
        is_deleted != 0,
        AuditInfo {
            created_by: row.get(start + 1)?,
            updated_by: row.get(start + 2)?,
            created_at: row.get(start + 3)?,
            updated_at: row.get(start + 4)?,
            deleted_at: row.get(start + 5)?,
        },
    ))
}

/// Fails with `NotFound` unless `id` names a live row of `table`.
pub(crate) fn ensure_active(
    conn: &Connection,
    table: &'static str,
    entity: &str,
    id: i64,
) -> HrisResult<()> {
    let exists: bool = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1 AND is_deleted = 0);"),
        params![id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(HrisError::not_found(entity, id))
    }
}

/// Counts live rows of `table` whose `column` equals `value`.
pub(crate) fn count_active_referencing(
    conn: &Connection,
    table: &'static str,
    column: &'static str,
    value: i64,
) -> HrisResult<i64> {
    let count = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1 AND is_deleted = 0;"),
        params![value],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Returns true if a live row other than `exclude_id` already uses `value` in `column`.
pub(crate) fn unique_value_taken(
    conn: &Connection,
    table: &'static str,
    column: &'static str,
    value: &str,
    exclude_id: Option<i64>,
) -> HrisResult<bool> {
    let taken = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {table}
             WHERE {column} = ?1 AND is_deleted = 0 AND (?2 IS NULL OR id != ?2));"
        ),
        params![value, exclude_id],
        |row| row.get(0),
    )?;
    Ok(taken)
}

pub(crate) fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Trims an optional text field, mapping blank values to `None`.
pub(crate) fn clean_optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
