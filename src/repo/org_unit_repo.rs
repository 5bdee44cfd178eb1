//! Organizational unit repository.

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::db::{bool_to_int, enum_from_sql};
use crate::error::{HrisError, HrisResult};
use crate::models::{Actor, OrgUnitInput, OrgUnitNode, OrganizationalUnit, build_tree};

use super::{
    audit_from_row, clean_optional, count_active_referencing, ensure_active, unique_value_taken,
};

const ORG_UNIT_SELECT_SQL: &str = "SELECT
    id,
    code,
    name,
    unit_type,
    parent_id,
    description,
    is_deleted,
    created_by,
    updated_by,
    created_at,
    updated_at,
    deleted_at
FROM organizational_units";

/// SQLite-backed organizational unit repository.
pub struct OrgUnitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> OrgUnitRepository<'conn> {
    /// Creates a repository over the given connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts a new unit under an optional live parent.
    pub fn create(&self, input: &OrgUnitInput, actor: &Actor) -> HrisResult<OrganizationalUnit> {
        input.validate()?;
        if let Some(parent_id) = input.parent_id {
            ensure_active(self.conn, "organizational_units", "parent unit", parent_id)?;
        }
        self.ensure_code_free(input.code.trim(), None)?;

        self.conn.execute(
            "INSERT INTO organizational_units (
                code, name, unit_type, parent_id, description, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                input.code.trim(),
                input.name.trim(),
                input.unit_type.as_str(),
                input.parent_id,
                clean_optional(&input.description),
                actor.user,
                actor.at,
            ],
        )?;

        self.require(self.conn.last_insert_rowid())
    }

    /// Fetches a unit by id.
    pub fn get(&self, id: i64, include_deleted: bool) -> HrisResult<Option<OrganizationalUnit>> {
        let unit = self
            .conn
            .query_row(
                &format!("{ORG_UNIT_SELECT_SQL} WHERE id = ?1 AND (?2 = 1 OR is_deleted = 0);"),
                params![id, bool_to_int(include_deleted)],
                parse_org_unit_row,
            )
            .optional()?;
        Ok(unit)
    }

    /// Fetches a live unit or fails with `NotFound`.
    pub fn require(&self, id: i64) -> HrisResult<OrganizationalUnit> {
        self.get(id, false)?
            .ok_or_else(|| HrisError::not_found("organizational unit", id))
    }

    /// Lists units ordered by name.
    pub fn list(&self, include_deleted: bool) -> HrisResult<Vec<OrganizationalUnit>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ORG_UNIT_SELECT_SQL} WHERE (?1 = 1 OR is_deleted = 0)
             ORDER BY name COLLATE NOCASE, id;"
        ))?;
        let units = stmt
            .query_map(params![bool_to_int(include_deleted)], parse_org_unit_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(units)
    }

    /// Returns the live units as a nested tree.
    pub fn tree(&self) -> HrisResult<Vec<OrgUnitNode>> {
        Ok(build_tree(self.list(false)?))
    }

    /// Replaces the editable fields of a live unit.
    ///
    /// Re-parenting is rejected when the new parent is the unit itself or
    /// one of its descendants.
    pub fn update(
        &self,
        id: i64,
        input: &OrgUnitInput,
        actor: &Actor,
    ) -> HrisResult<OrganizationalUnit> {
        input.validate()?;
        self.require(id)?;
        if let Some(parent_id) = input.parent_id {
            ensure_active(self.conn, "organizational_units", "parent unit", parent_id)?;
            if self.is_self_or_descendant(parent_id, id)? {
                return Err(HrisError::conflict(format!(
                    "unit {parent_id} is unit {id} or one of its descendants and cannot be its parent"
                )));
            }
        }
        self.ensure_code_free(input.code.trim(), Some(id))?;

        self.conn.execute(
            "UPDATE organizational_units SET
                code = ?1, name = ?2, unit_type = ?3, parent_id = ?4, description = ?5,
                updated_by = ?6, updated_at = ?7
             WHERE id = ?8 AND is_deleted = 0;",
            params![
                input.code.trim(),
                input.name.trim(),
                input.unit_type.as_str(),
                input.parent_id,
                clean_optional(&input.description),
                actor.user,
                actor.at,
                id,
            ],
        )?;

        self.require(id)
    }

    /// Marks a unit as deleted once nothing live depends on it.
    pub fn soft_delete(&self, id: i64, actor: &Actor) -> HrisResult<()> {
        self.require(id)?;

        let dependents = [
            ("organizational_units", "parent_id", "child unit(s)"),
            ("positions", "org_unit_id", "position(s)"),
            ("employees", "org_unit_id", "employee(s)"),
        ];
        for (table, column, label) in dependents {
            let count = count_active_referencing(self.conn, table, column, id)?;
            if count > 0 {
                return Err(HrisError::conflict(format!(
                    "organizational unit {id} still has {count} active {label}"
                )));
            }
        }

        self.conn.execute(
            "UPDATE organizational_units
             SET is_deleted = 1, deleted_at = ?1, updated_by = ?2, updated_at = ?1
             WHERE id = ?3 AND is_deleted = 0;",
            params![actor.at, actor.user, id],
        )?;
        Ok(())
    }

    /// Brings a soft-deleted unit back under its old parent.
    ///
    /// Fails with `Conflict` when the unit is live, its code has been reused,
    /// or its parent is gone or now sits below it.
    pub fn restore(&self, id: i64, actor: &Actor) -> HrisResult<OrganizationalUnit> {
        let unit = self
            .get(id, true)?
            .ok_or_else(|| HrisError::not_found("organizational unit", id))?;
        if !unit.is_deleted {
            return Err(HrisError::conflict(format!(
                "organizational unit {id} is not deleted"
            )));
        }
        if let Some(parent_id) = unit.parent_id {
            ensure_active(self.conn, "organizational_units", "parent unit", parent_id).map_err(
                |_| {
                    HrisError::conflict(format!(
                        "parent unit {parent_id} of organizational unit {id} is deleted"
                    ))
                },
            )?;
            if self.is_self_or_descendant(parent_id, id)? {
                return Err(HrisError::conflict(format!(
                    "unit {parent_id} is unit {id} or one of its descendants and cannot be its parent"
                )));
            }
        }
        if unique_value_taken(self.conn, "organizational_units", "code", &unit.code, Some(id))? {
            return Err(HrisError::conflict(format!(
                "organizational unit code '{}' was reassigned while this unit was deleted",
                unit.code
            )));
        }

        self.conn.execute(
            "UPDATE organizational_units
             SET is_deleted = 0, deleted_at = NULL, updated_by = ?1, updated_at = ?2
             WHERE id = ?3;",
            params![actor.user, actor.at, id],
        )?;
        self.require(id)
    }

    fn ensure_code_free(&self, code: &str, exclude_id: Option<i64>) -> HrisResult<()> {
        if unique_value_taken(self.conn, "organizational_units", "code", code, exclude_id)? {
            return Err(HrisError::conflict(format!(
                "organizational unit code '{code}' is already in use"
            )));
        }
        Ok(())
    }

    /// Walks up from `start` and reports whether `target` is on the path.
    fn is_self_or_descendant(&self, start: i64, target: i64) -> HrisResult<bool> {
        let mut current = Some(start);
        let mut steps = 0usize;
        while let Some(id) = current {
            if id == target {
                return Ok(true);
            }
            // Existing data should be acyclic; the bound stops a corrupted chain.
            steps += 1;
            if steps > 10_000 {
                return Ok(true);
            }
            current = self
                .conn
                .query_row(
                    "SELECT parent_id FROM organizational_units WHERE id = ?1;",
                    params![id],
                    |row| row.get::<_, Option<i64>>(0),
                )
                .optional()?
                .flatten();
        }
        Ok(false)
    }
}

fn parse_org_unit_row(row: &Row<'_>) -> rusqlite::Result<OrganizationalUnit> {
    let unit_type: String = row.get(3)?;
    let (is_deleted, audit) = audit_from_row(row, 6)?;
    Ok(OrganizationalUnit {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        unit_type: enum_from_sql(3, &unit_type)?,
        parent_id: row.get(4)?,
        description: row.get(5)?,
        is_deleted,
        audit,
    })
}
