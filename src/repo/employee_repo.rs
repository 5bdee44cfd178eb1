//! Employee repository.

use rusqlite::types::Value;
use rusqlite::{Connection, Row, params, params_from_iter};
use serde::Deserialize;

use crate::db::{bool_to_int, decimal_from_sql, enum_from_sql};
use crate::error::{HrisError, HrisResult};
use crate::models::{Actor, Address, Employee, EmployeeInput, EmploymentStatus};

use super::{audit_from_row, clamp_limit, clean_optional, ensure_active, unique_value_taken};

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    id,
    employee_number,
    first_name,
    middle_name,
    last_name,
    suffix,
    email,
    phone,
    birth_date,
    hire_date,
    employment_status,
    position_id,
    org_unit_id,
    region_code,
    province_code,
    city_code,
    barangay_code,
    street_address,
    daily_rate,
    is_deleted,
    created_by,
    updated_by,
    created_at,
    updated_at,
    deleted_at
FROM employees";

/// Filters for listing employees.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeQuery {
    /// Only employees assigned to this unit.
    pub org_unit_id: Option<i64>,
    /// Only employees holding this position.
    pub position_id: Option<i64>,
    /// Only employees with this status.
    pub status: Option<EmploymentStatus>,
    /// Case-insensitive match on names or employee number.
    pub search: Option<String>,
    /// Include soft-deleted rows.
    #[serde(default)]
    pub include_deleted: bool,
    /// Page size.
    pub limit: Option<u32>,
    /// Rows to skip.
    #[serde(default)]
    pub offset: u32,
}

/// SQLite-backed employee repository.
pub struct EmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> EmployeeRepository<'conn> {
    /// Creates a repository over the given connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts a new employee after validating its fields and references.
    pub fn create(&self, input: &EmployeeInput, actor: &Actor) -> HrisResult<Employee> {
        input.validate()?;
        self.check_references(input)?;
        let employee_number = input.employee_number.trim();
        if unique_value_taken(self.conn, "employees", "employee_number", employee_number, None)? {
            return Err(HrisError::conflict(format!(
                "employee number '{employee_number}' is already in use"
            )));
        }

        self.conn.execute(
            "INSERT INTO employees (
                employee_number, first_name, middle_name, last_name, suffix,
                email, phone, birth_date, hire_date, employment_status,
                position_id, org_unit_id, region_code, province_code, city_code,
                barangay_code, street_address, daily_rate, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20);",
            params![
                employee_number,
                input.first_name.trim(),
                clean_optional(&input.middle_name),
                input.last_name.trim(),
                clean_optional(&input.suffix),
                clean_optional(&input.email),
                clean_optional(&input.phone),
                input.birth_date,
                input.hire_date,
                input.employment_status.as_str(),
                input.position_id,
                input.org_unit_id,
                clean_optional(&input.address.region_code),
                clean_optional(&input.address.province_code),
                clean_optional(&input.address.city_code),
                clean_optional(&input.address.barangay_code),
                clean_optional(&input.address.street_address),
                input.daily_rate.map(|r| r.to_string()),
                actor.user,
                actor.at,
            ],
        )?;

        self.require(self.conn.last_insert_rowid())
    }

    /// Fetches an employee by id.
    pub fn get(&self, id: i64, include_deleted: bool) -> HrisResult<Option<Employee>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EMPLOYEE_SELECT_SQL} WHERE id = ?1 AND (?2 = 1 OR is_deleted = 0);"
        ))?;
        let mut rows = stmt.query(params![id, bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row)?));
        }
        Ok(None)
    }

    /// Fetches a live employee or fails with `NotFound`.
    pub fn require(&self, id: i64) -> HrisResult<Employee> {
        self.get(id, false)?
            .ok_or_else(|| HrisError::not_found("employee", id))
    }

    /// Lists employees ordered by last name, first name.
    pub fn list(&self, query: &EmployeeQuery) -> HrisResult<Vec<Employee>> {
        let mut sql = format!("{EMPLOYEE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND is_deleted = 0");
        }
        if let Some(org_unit_id) = query.org_unit_id {
            sql.push_str(" AND org_unit_id = ?");
            bind_values.push(Value::Integer(org_unit_id));
        }
        if let Some(position_id) = query.position_id {
            sql.push_str(" AND position_id = ?");
            bind_values.push(Value::Integer(position_id));
        }
        if let Some(status) = query.status {
            sql.push_str(" AND employment_status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            sql.push_str(
                " AND (first_name LIKE ? ESCAPE '\\' OR last_name LIKE ? ESCAPE '\\'
                  OR employee_number LIKE ? ESCAPE '\\')",
            );
            let pattern = format!("%{}%", escape_like(search));
            for _ in 0..3 {
                bind_values.push(Value::Text(pattern.clone()));
            }
        }

        sql.push_str(" ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE, id LIMIT ? OFFSET ?;");
        bind_values.push(Value::Integer(i64::from(clamp_limit(query.limit))));
        bind_values.push(Value::Integer(i64::from(query.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }
        Ok(employees)
    }

    /// Replaces the editable fields of a live employee.
    pub fn update(&self, id: i64, input: &EmployeeInput, actor: &Actor) -> HrisResult<Employee> {
        input.validate()?;
        self.require(id)?;
        self.check_references(input)?;
        let employee_number = input.employee_number.trim();
        if unique_value_taken(self.conn, "employees", "employee_number", employee_number, Some(id))? {
            return Err(HrisError::conflict(format!(
                "employee number '{employee_number}' is already in use"
            )));
        }

        self.conn.execute(
            "UPDATE employees SET
                employee_number = ?1, first_name = ?2, middle_name = ?3, last_name = ?4,
                suffix = ?5, email = ?6, phone = ?7, birth_date = ?8, hire_date = ?9,
                employment_status = ?10, position_id = ?11, org_unit_id = ?12,
                region_code = ?13, province_code = ?14, city_code = ?15, barangay_code = ?16,
                street_address = ?17, daily_rate = ?18, updated_by = ?19, updated_at = ?20
             WHERE id = ?21 AND is_deleted = 0;",
            params![
                employee_number,
                input.first_name.trim(),
                clean_optional(&input.middle_name),
                input.last_name.trim(),
                clean_optional(&input.suffix),
                clean_optional(&input.email),
                clean_optional(&input.phone),
                input.birth_date,
                input.hire_date,
                input.employment_status.as_str(),
                input.position_id,
                input.org_unit_id,
                clean_optional(&input.address.region_code),
                clean_optional(&input.address.province_code),
                clean_optional(&input.address.city_code),
                clean_optional(&input.address.barangay_code),
                clean_optional(&input.address.street_address),
                input.daily_rate.map(|r| r.to_string()),
                actor.user,
                actor.at,
                id,
            ],
        )?;

        self.require(id)
    }

    /// Marks an employee as deleted.
    pub fn soft_delete(&self, id: i64, actor: &Actor) -> HrisResult<()> {
        let changed = self.conn.execute(
            "UPDATE employees
             SET is_deleted = 1, deleted_at = ?1, updated_by = ?2, updated_at = ?1
             WHERE id = ?3 AND is_deleted = 0;",
            params![actor.at, actor.user, id],
        )?;
        if changed == 0 {
            return Err(HrisError::not_found("employee", id));
        }
        Ok(())
    }

    /// Brings a soft-deleted employee back.
    ///
    /// Fails with `Conflict` when the record is live, its number has been
    /// reused, or its position or organizational unit has since been deleted.
    pub fn restore(&self, id: i64, actor: &Actor) -> HrisResult<Employee> {
        let employee = self
            .get(id, true)?
            .ok_or_else(|| HrisError::not_found("employee", id))?;
        if !employee.is_deleted {
            return Err(HrisError::conflict(format!("employee {id} is not deleted")));
        }
        let references = [
            ("positions", "position", employee.position_id),
            ("organizational_units", "organizational unit", employee.org_unit_id),
        ];
        for (table, entity, reference) in references {
            if let Some(reference) = reference {
                ensure_active(self.conn, table, entity, reference).map_err(|_| {
                    HrisError::conflict(format!(
                        "employee {id} belongs to {entity} {reference}, which is deleted"
                    ))
                })?;
            }
        }
        if unique_value_taken(
            self.conn,
            "employees",
            "employee_number",
            &employee.employee_number,
            Some(id),
        )? {
            return Err(HrisError::conflict(format!(
                "employee number '{}' was reassigned while this record was deleted",
                employee.employee_number
            )));
        }

        self.conn.execute(
            "UPDATE employees
             SET is_deleted = 0, deleted_at = NULL, updated_by = ?1, updated_at = ?2
             WHERE id = ?3;",
            params![actor.user, actor.at, id],
        )?;
        self.require(id)
    }

    fn check_references(&self, input: &EmployeeInput) -> HrisResult<()> {
        if let Some(position_id) = input.position_id {
            ensure_active(self.conn, "positions", "position", position_id)?;
        }
        if let Some(org_unit_id) = input.org_unit_id {
            ensure_active(self.conn, "organizational_units", "organizational unit", org_unit_id)?;
        }
        Ok(())
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn parse_employee_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    let status: String = row.get(10)?;
    let daily_rate: Option<String> = row.get(18)?;
    let (is_deleted, audit) = audit_from_row(row, 19)?;

    Ok(Employee {
        id: row.get(0)?,
        employee_number: row.get(1)?,
        first_name: row.get(2)?,
        middle_name: row.get(3)?,
        last_name: row.get(4)?,
        suffix: row.get(5)?,
        email: row.get(6)?,
        phone: row.get(7)?,
        birth_date: row.get(8)?,
        hire_date: row.get(9)?,
        employment_status: enum_from_sql(10, &status)?,
        position_id: row.get(11)?,
        org_unit_id: row.get(12)?,
        address: Address {
            region_code: row.get(13)?,
            province_code: row.get(14)?,
            city_code: row.get(15)?,
            barangay_code: row.get(16)?,
            street_address: row.get(17)?,
        },
        daily_rate: daily_rate
            .as_deref()
            .map(|raw| decimal_from_sql(18, raw))
            .transpose()?,
        is_deleted,
        audit,
    })
}
