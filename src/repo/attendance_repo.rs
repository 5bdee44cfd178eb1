//! Attendance repository.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use serde::Deserialize;

use crate::db::enum_from_sql;
use crate::error::{HrisError, HrisResult};
use crate::models::{Actor, Attendance, AttendanceMethod};

use super::{audit_from_row, clamp_limit};

const ATTENDANCE_SELECT_SQL: &str = "SELECT
    id,
    employee_id,
    attendance_date,
    time_in,
    time_out,
    method,
    match_distance,
    remarks,
    is_deleted,
    created_by,
    updated_by,
    created_at,
    updated_at,
    deleted_at
FROM attendance";

/// Filters for listing attendance rows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceQuery {
    /// Only rows of this employee.
    pub employee_id: Option<i64>,
    /// First date to include.
    pub from: Option<NaiveDate>,
    /// Last date to include.
    pub to: Option<NaiveDate>,
    /// Page size.
    pub limit: Option<u32>,
    /// Rows to skip.
    #[serde(default)]
    pub offset: u32,
}

/// A new attendance row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance<'a> {
    /// The employee.
    pub employee_id: i64,
    /// Local time-in; its date becomes the attendance date.
    pub time_in: NaiveDateTime,
    /// Local time-out, for manual entries.
    pub time_out: Option<NaiveDateTime>,
    /// How the row is being recorded.
    pub method: AttendanceMethod,
    /// Face distance when recorded at a kiosk.
    pub match_distance: Option<f64>,
    /// Free-form remarks.
    pub remarks: Option<&'a str>,
}

/// SQLite-backed attendance repository.
pub struct AttendanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> AttendanceRepository<'conn> {
    /// Creates a repository over the given connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts a row dated by its time-in.
    ///
    /// Fails with `Conflict` if the employee already has a live row that day.
    pub fn insert(&self, new: &NewAttendance<'_>, actor: &Actor) -> HrisResult<Attendance> {
        let date = new.time_in.date();
        if self.find_for_day(new.employee_id, date)?.is_some() {
            return Err(HrisError::conflict(format!(
                "employee {} already has attendance on {date}",
                new.employee_id
            )));
        }

        self.conn.execute(
            "INSERT INTO attendance (
                employee_id, attendance_date, time_in, time_out, method,
                match_distance, remarks, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                new.employee_id,
                date,
                new.time_in,
                new.time_out,
                new.method.as_str(),
                new.match_distance,
                new.remarks,
                actor.user,
                actor.at,
            ],
        )?;

        self.require(self.conn.last_insert_rowid())
    }

    /// Records the time-out of an open row.
    pub fn set_time_out(
        &self,
        id: i64,
        time_out: NaiveDateTime,
        match_distance: Option<f64>,
        actor: &Actor,
    ) -> HrisResult<Attendance> {
        let changed = self.conn.execute(
            "UPDATE attendance
             SET time_out = ?1, match_distance = COALESCE(?2, match_distance),
                 updated_by = ?3, updated_at = ?4
             WHERE id = ?5 AND is_deleted = 0 AND time_out IS NULL;",
            params![time_out, match_distance, actor.user, actor.at, id],
        )?;
        if changed == 0 {
            return Err(HrisError::not_found("open attendance", id));
        }
        self.require(id)
    }

    /// The live row of an employee for a date, if any.
    pub fn find_for_day(&self, employee_id: i64, date: NaiveDate) -> HrisResult<Option<Attendance>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "{ATTENDANCE_SELECT_SQL}
                     WHERE employee_id = ?1 AND attendance_date = ?2 AND is_deleted = 0;"
                ),
                params![employee_id, date],
                parse_attendance_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Fetches a live row or fails with `NotFound`.
    pub fn require(&self, id: i64) -> HrisResult<Attendance> {
        self.conn
            .query_row(
                &format!("{ATTENDANCE_SELECT_SQL} WHERE id = ?1 AND is_deleted = 0;"),
                params![id],
                parse_attendance_row,
            )
            .optional()?
            .ok_or_else(|| HrisError::not_found("attendance", id))
    }

    /// Lists live rows, newest first.
    pub fn list(&self, query: &AttendanceQuery) -> HrisResult<Vec<Attendance>> {
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(HrisError::validation("from", "must not be after 'to'"));
            }
        }

        let mut sql = format!("{ATTENDANCE_SELECT_SQL} WHERE is_deleted = 0");
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(employee_id) = query.employee_id {
            sql.push_str(" AND employee_id = ?");
            bind_values.push(Value::Integer(employee_id));
        }
        if let Some(from) = query.from {
            sql.push_str(" AND attendance_date >= ?");
            bind_values.push(Value::Text(from.to_string()));
        }
        if let Some(to) = query.to {
            sql.push_str(" AND attendance_date <= ?");
            bind_values.push(Value::Text(to.to_string()));
        }
        sql.push_str(" ORDER BY attendance_date DESC, employee_id, id DESC LIMIT ? OFFSET ?;");
        bind_values.push(Value::Integer(i64::from(clamp_limit(query.limit))));
        bind_values.push(Value::Integer(i64::from(query.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(bind_values), parse_attendance_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Marks a row as deleted.
    pub fn soft_delete(&self, id: i64, actor: &Actor) -> HrisResult<()> {
        let changed = self.conn.execute(
            "UPDATE attendance
             SET is_deleted = 1, deleted_at = ?1, updated_by = ?2, updated_at = ?1
             WHERE id = ?3 AND is_deleted = 0;",
            params![actor.at, actor.user, id],
        )?;
        if changed == 0 {
            return Err(HrisError::not_found("attendance", id));
        }
        Ok(())
    }
}

fn parse_attendance_row(row: &Row<'_>) -> rusqlite::Result<Attendance> {
    let method: String = row.get(5)?;
    let (is_deleted, audit) = audit_from_row(row, 8)?;
    Ok(Attendance {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        attendance_date: row.get(2)?,
        time_in: row.get(3)?,
        time_out: row.get(4)?,
        method: enum_from_sql(5, &method)?,
        match_distance: row.get(6)?,
        remarks: row.get(7)?,
        is_deleted,
        audit,
    })
}
