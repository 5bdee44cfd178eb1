//! Position repository.

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use serde::Deserialize;

use crate::db::bool_to_int;
use crate::error::{HrisError, HrisResult};
use crate::models::{Actor, Position, PositionInput};

use super::{
    audit_from_row, clean_optional, count_active_referencing, ensure_active, unique_value_taken,
};

const POSITION_SELECT_SQL: &str = "SELECT
    id,
    code,
    title,
    org_unit_id,
    description,
    is_deleted,
    created_by,
    updated_by,
    created_at,
    updated_at,
    deleted_at
FROM positions";

/// Filters for listing positions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PositionQuery {
    /// Only positions owned by this unit.
    pub org_unit_id: Option<i64>,
    /// Include soft-deleted rows.
    #[serde(default)]
    pub include_deleted: bool,
}

/// SQLite-backed position repository.
pub struct PositionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> PositionRepository<'conn> {
    /// Creates a repository over the given connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts a new position.
    pub fn create(&self, input: &PositionInput, actor: &Actor) -> HrisResult<Position> {
        input.validate()?;
        self.check_org_unit(input)?;
        self.ensure_code_free(input.code.trim(), None)?;

        self.conn.execute(
            "INSERT INTO positions (code, title, org_unit_id, description, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                input.code.trim(),
                input.title.trim(),
                input.org_unit_id,
                clean_optional(&input.description),
                actor.user,
                actor.at,
            ],
        )?;

        self.require(self.conn.last_insert_rowid())
    }

    /// Fetches a position by id.
    pub fn get(&self, id: i64, include_deleted: bool) -> HrisResult<Option<Position>> {
        let position = self
            .conn
            .query_row(
                &format!("{POSITION_SELECT_SQL} WHERE id = ?1 AND (?2 = 1 OR is_deleted = 0);"),
                params![id, bool_to_int(include_deleted)],
                parse_position_row,
            )
            .optional()?;
        Ok(position)
    }

    /// Fetches a live position or fails with `NotFound`.
    pub fn require(&self, id: i64) -> HrisResult<Position> {
        self.get(id, false)?
            .ok_or_else(|| HrisError::not_found("position", id))
    }

    /// Lists positions ordered by title.
    pub fn list(&self, query: &PositionQuery) -> HrisResult<Vec<Position>> {
        let mut sql = format!("{POSITION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        if !query.include_deleted {
            sql.push_str(" AND is_deleted = 0");
        }
        if let Some(org_unit_id) = query.org_unit_id {
            sql.push_str(" AND org_unit_id = ?");
            bind_values.push(Value::Integer(org_unit_id));
        }
        sql.push_str(" ORDER BY title COLLATE NOCASE, id;");

        let mut stmt = self.conn.prepare(&sql)?;
        let positions = stmt
            .query_map(params_from_iter(bind_values), parse_position_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(positions)
    }

    /// Replaces the editable fields of a live position.
    pub fn update(&self, id: i64, input: &PositionInput, actor: &Actor) -> HrisResult<Position> {
        input.validate()?;
        self.require(id)?;
        self.check_org_unit(input)?;
        self.ensure_code_free(input.code.trim(), Some(id))?;

        self.conn.execute(
            "UPDATE positions SET
                code = ?1, title = ?2, org_unit_id = ?3, description = ?4,
                updated_by = ?5, updated_at = ?6
             WHERE id = ?7 AND is_deleted = 0;",
            params![
                input.code.trim(),
                input.title.trim(),
                input.org_unit_id,
                clean_optional(&input.description),
                actor.user,
                actor.at,
                id,
            ],
        )?;

        self.require(id)
    }

    /// Marks a position as deleted once no live employee holds it.
    pub fn soft_delete(&self, id: i64, actor: &Actor) -> HrisResult<()> {
        self.require(id)?;
        let holders = count_active_referencing(self.conn, "employees", "position_id", id)?;
        if holders > 0 {
            return Err(HrisError::conflict(format!(
                "position {id} is still held by {holders} active employee(s)"
            )));
        }

        self.conn.execute(
            "UPDATE positions
             SET is_deleted = 1, deleted_at = ?1, updated_by = ?2, updated_at = ?1
             WHERE id = ?3 AND is_deleted = 0;",
            params![actor.at, actor.user, id],
        )?;
        Ok(())
    }

    /// Brings a soft-deleted position back.
    ///
    /// Fails with `Conflict` when the position is live, its code has been
    /// reused, or its organizational unit has since been deleted.
    pub fn restore(&self, id: i64, actor: &Actor) -> HrisResult<Position> {
        let position = self
            .get(id, true)?
            .ok_or_else(|| HrisError::not_found("position", id))?;
        if !position.is_deleted {
            return Err(HrisError::conflict(format!("position {id} is not deleted")));
        }
        if let Some(org_unit_id) = position.org_unit_id {
            ensure_active(self.conn, "organizational_units", "organizational unit", org_unit_id)
                .map_err(|_| {
                    HrisError::conflict(format!(
                        "position {id} belongs to organizational unit {org_unit_id}, which is deleted"
                    ))
                })?;
        }
        if unique_value_taken(self.conn, "positions", "code", &position.code, Some(id))? {
            return Err(HrisError::conflict(format!(
                "position code '{}' was reassigned while this position was deleted",
                position.code
            )));
        }

        self.conn.execute(
            "UPDATE positions
             SET is_deleted = 0, deleted_at = NULL, updated_by = ?1, updated_at = ?2
             WHERE id = ?3;",
            params![actor.user, actor.at, id],
        )?;
        self.require(id)
    }

    fn check_org_unit(&self, input: &PositionInput) -> HrisResult<()> {
        if let Some(org_unit_id) = input.org_unit_id {
            ensure_active(self.conn, "organizational_units", "organizational unit", org_unit_id)?;
        }
        Ok(())
    }

    fn ensure_code_free(&self, code: &str, exclude_id: Option<i64>) -> HrisResult<()> {
        if unique_value_taken(self.conn, "positions", "code", code, exclude_id)? {
            return Err(HrisError::conflict(format!(
                "position code '{code}' is already in use"
            )));
        }
        Ok(())
    }
}

fn parse_position_row(row: &Row<'_>) -> rusqlite::Result<Position> {
    let (is_deleted, audit) = audit_from_row(row, 5)?;
    Ok(Position {
        id: row.get(0)?,
        code: row.get(1)?,
        title: row.get(2)?,
        org_unit_id: row.get(3)?,
        description: row.get(4)?,
        is_deleted,
        audit,
    })
}
