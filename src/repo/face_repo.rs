//! Face descriptor repository.

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::{HrisError, HrisResult};
use crate::models::{Actor, FaceData, FaceDescriptor};

/// SQLite-backed face descriptor repository. One descriptor per employee.
pub struct FaceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> FaceRepository<'conn> {
    /// Creates a repository over the given connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Stores or replaces the descriptor of an employee.
    pub fn upsert(
        &self,
        employee_id: i64,
        descriptor: &FaceDescriptor,
        actor: &Actor,
    ) -> HrisResult<FaceData> {
        let encoded = serde_json::to_string(descriptor)?;
        self.conn.execute(
            "INSERT INTO face_data (employee_id, descriptor, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(employee_id) DO UPDATE SET
                descriptor = excluded.descriptor,
                updated_at = excluded.created_at;",
            params![employee_id, encoded, actor.user, actor.at],
        )?;
        self.get(employee_id)?
            .ok_or_else(|| HrisError::not_found("face data", employee_id))
    }

    /// The enrolled descriptor of an employee, if any.
    pub fn get(&self, employee_id: i64) -> HrisResult<Option<FaceData>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, employee_id, descriptor, created_by, created_at, updated_at
                 FROM face_data WHERE employee_id = ?1;",
                params![employee_id],
                parse_face_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Removes the descriptor of an employee.
    pub fn delete(&self, employee_id: i64) -> HrisResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM face_data WHERE employee_id = ?1;",
            params![employee_id],
        )?;
        if changed == 0 {
            return Err(HrisError::not_found("face data", employee_id));
        }
        Ok(())
    }
}

fn parse_face_row(row: &Row<'_>) -> rusqlite::Result<FaceData> {
    let raw: String = row.get(2)?;
    let descriptor: FaceDescriptor = serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(FaceData {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        descriptor,
        created_by: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
