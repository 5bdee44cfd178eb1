//! Minimum-wage rate repository.
//!
//! Plain row access only. Keeping the "one current rate per region" flag
//! consistent is the job of [`crate::wage`], which wraps these calls in a
//! transaction together with the activation step.

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use serde::Deserialize;

use crate::db::{bool_to_int, decimal_from_sql};
use crate::error::{HrisError, HrisResult};
use crate::models::{Actor, WageRate, WageRateInput, WageRateStatus};

use super::audit_from_row;

const WAGE_RATE_SELECT_SQL: &str = "SELECT
    id,
    region_code,
    region_name,
    daily_rate,
    wage_order,
    effective_date,
    is_current,
    is_deleted,
    created_by,
    updated_by,
    created_at,
    updated_at,
    deleted_at
FROM minimum_wage_rates";

/// Filters for listing wage rates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WageRateQuery {
    /// Only rates for this region.
    pub region_code: Option<String>,
    /// Only rates in this state relative to the local date.
    pub status: Option<WageRateStatus>,
    /// Include soft-deleted rows.
    #[serde(default)]
    pub include_deleted: bool,
}

/// SQLite-backed wage rate repository.
pub struct WageRateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> WageRateRepository<'conn> {
    /// Creates a repository over the given connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts a rate with `is_current = 0`.
    pub fn insert(&self, input: &WageRateInput, actor: &Actor) -> HrisResult<i64> {
        input.validate()?;
        self.conn.execute(
            "INSERT INTO minimum_wage_rates (
                region_code, region_name, daily_rate, wage_order, effective_date,
                is_current, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7);",
            params![
                input.region_code.trim(),
                input.region_name.trim(),
                input.daily_rate.to_string(),
                input.wage_order.trim(),
                input.effective_date,
                actor.user,
                actor.at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fetches a rate by id.
    pub fn get(&self, id: i64, include_deleted: bool) -> HrisResult<Option<WageRate>> {
        let rate = self
            .conn
            .query_row(
                &format!("{WAGE_RATE_SELECT_SQL} WHERE id = ?1 AND (?2 = 1 OR is_deleted = 0);"),
                params![id, bool_to_int(include_deleted)],
                parse_wage_rate_row,
            )
            .optional()?;
        Ok(rate)
    }

    /// Fetches a live rate or fails with `NotFound`.
    pub fn require(&self, id: i64) -> HrisResult<WageRate> {
        self.get(id, false)?
            .ok_or_else(|| HrisError::not_found("wage rate", id))
    }

    /// Lists rates newest first, filtered by region and status on `today`.
    pub fn list(&self, query: &WageRateQuery, today: NaiveDate) -> HrisResult<Vec<WageRate>> {
        let mut sql = format!("{WAGE_RATE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND is_deleted = 0");
        }
        if let Some(region_code) = query.region_code.as_deref() {
            sql.push_str(" AND region_code = ?");
            bind_values.push(Value::Text(region_code.to_string()));
        }
        match query.status {
            Some(WageRateStatus::Current) => sql.push_str(" AND is_current = 1"),
            Some(WageRateStatus::Upcoming) => {
                sql.push_str(" AND is_current = 0 AND effective_date > ?");
                bind_values.push(Value::Text(today.to_string()));
            }
            Some(WageRateStatus::Historical) => {
                sql.push_str(" AND is_current = 0 AND effective_date <= ?");
                bind_values.push(Value::Text(today.to_string()));
            }
            None => {}
        }
        sql.push_str(" ORDER BY region_code, effective_date DESC, id DESC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let rates = stmt
            .query_map(params_from_iter(bind_values), parse_wage_rate_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rates)
    }

    /// Replaces the editable fields of a live rate. Leaves `is_current` alone.
    pub fn update(&self, id: i64, input: &WageRateInput, actor: &Actor) -> HrisResult<()> {
        input.validate()?;
        let changed = self.conn.execute(
            "UPDATE minimum_wage_rates SET
                region_code = ?1, region_name = ?2, daily_rate = ?3, wage_order = ?4,
                effective_date = ?5, updated_by = ?6, updated_at = ?7
             WHERE id = ?8 AND is_deleted = 0;",
            params![
                input.region_code.trim(),
                input.region_name.trim(),
                input.daily_rate.to_string(),
                input.wage_order.trim(),
                input.effective_date,
                actor.user,
                actor.at,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(HrisError::not_found("wage rate", id));
        }
        Ok(())
    }

    /// Marks a rate as deleted and clears its current flag.
    pub fn soft_delete(&self, id: i64, actor: &Actor) -> HrisResult<()> {
        let changed = self.conn.execute(
            "UPDATE minimum_wage_rates
             SET is_deleted = 1, is_current = 0, deleted_at = ?1, updated_by = ?2, updated_at = ?1
             WHERE id = ?3 AND is_deleted = 0;",
            params![actor.at, actor.user, id],
        )?;
        if changed == 0 {
            return Err(HrisError::not_found("wage rate", id));
        }
        Ok(())
    }

    /// Clears the deleted flag of a rate.
    pub fn restore(&self, id: i64, actor: &Actor) -> HrisResult<()> {
        let changed = self.conn.execute(
            "UPDATE minimum_wage_rates
             SET is_deleted = 0, deleted_at = NULL, updated_by = ?1, updated_at = ?2
             WHERE id = ?3;",
            params![actor.user, actor.at, id],
        )?;
        if changed == 0 {
            return Err(HrisError::not_found("wage rate", id));
        }
        Ok(())
    }

    /// Latest live rate of a region effective on or before `date`.
    pub fn latest_effective_on(
        &self,
        region_code: &str,
        date: NaiveDate,
    ) -> HrisResult<Option<WageRate>> {
        let rate = self
            .conn
            .query_row(
                &format!(
                    "{WAGE_RATE_SELECT_SQL}
                     WHERE region_code = ?1 AND is_deleted = 0 AND effective_date <= ?2
                     ORDER BY effective_date DESC, id DESC
                     LIMIT 1;"
                ),
                params![region_code, date],
                parse_wage_rate_row,
            )
            .optional()?;
        Ok(rate)
    }

    /// The rate flagged current for a region.
    pub fn current_for_region(&self, region_code: &str) -> HrisResult<Option<WageRate>> {
        let rate = self
            .conn
            .query_row(
                &format!(
                    "{WAGE_RATE_SELECT_SQL}
                     WHERE region_code = ?1 AND is_deleted = 0 AND is_current = 1
                     ORDER BY id DESC
                     LIMIT 1;"
                ),
                params![region_code],
                parse_wage_rate_row,
            )
            .optional()?;
        Ok(rate)
    }

    /// Every region code that has at least one row.
    pub fn region_codes(&self) -> HrisResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT region_code FROM minimum_wage_rates ORDER BY region_code;")?;
        let codes = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(codes)
    }

    /// Sets `is_current` to 1 for `current_id` and 0 for every other row of the region.
    ///
    /// Returns the number of rows whose flag changed.
    pub fn set_current(&self, region_code: &str, current_id: Option<i64>) -> HrisResult<usize> {
        let changed = self.conn.execute(
            "UPDATE minimum_wage_rates
             SET is_current = CASE WHEN id = ?2 THEN 1 ELSE 0 END
             WHERE region_code = ?1
               AND is_current != CASE WHEN id = ?2 THEN 1 ELSE 0 END;",
            params![region_code, current_id],
        )?;
        Ok(changed)
    }
}

fn parse_wage_rate_row(row: &Row<'_>) -> rusqlite::Result<WageRate> {
    let daily_rate: String = row.get(3)?;
    let is_current: i64 = row.get(6)?;
    let (is_deleted, audit) = audit_from_row(row, 7)?;
    Ok(WageRate {
        id: row.get(0)?,
        region_code: row.get(1)?,
        region_name: row.get(2)?,
        daily_rate: decimal_from_sql(3, &daily_rate)?,
        wage_order: row.get(4)?,
        effective_date: row.get(5)?,
        is_current: is_current != 0,
        is_deleted,
        audit,
    })
}
