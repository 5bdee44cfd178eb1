//! Minimum wage compliance checks for employees.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{HrisError, HrisResult};
use crate::models::{Employee, WageRate};
use crate::repo::EmployeeRepository;

use super::rates::rate_for_region_on;

/// How an employee's daily rate compares with their region's minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WageCompliance {
    /// The employee checked.
    pub employee_id: i64,
    /// PSGC region of the employee's address.
    pub region_code: String,
    /// The date the minimum was looked up for.
    pub as_of: NaiveDate,
    /// The employee's daily rate.
    pub employee_daily_rate: Decimal,
    /// The minimum wage in force.
    pub minimum_daily_rate: Decimal,
    /// The wage rate row used.
    pub wage_rate_id: i64,
    /// Its wage order reference.
    pub wage_order: String,
    /// True when the employee earns at least the minimum.
    pub compliant: bool,
    /// Amount below the minimum, zero when compliant.
    pub shortfall: Decimal,
}

/// Compares a daily rate against a wage rate.
pub fn compare_to_minimum(
    employee_id: i64,
    daily_rate: Decimal,
    minimum: &WageRate,
    as_of: NaiveDate,
) -> WageCompliance {
    let shortfall = (minimum.daily_rate - daily_rate).max(Decimal::ZERO);
    WageCompliance {
        employee_id,
        region_code: minimum.region_code.clone(),
        as_of,
        employee_daily_rate: daily_rate,
        minimum_daily_rate: minimum.daily_rate,
        wage_rate_id: minimum.id,
        wage_order: minimum.wage_order.clone(),
        compliant: shortfall.is_zero(),
        shortfall,
    }
}

/// Checks a stored employee against the minimum wage of their region on `as_of`.
///
/// # Returns
///
/// Fails with `Validation` when the employee has no region or no daily
/// rate, and with `NotFound` when the region has no rate in force.
pub fn check_compliance(
    conn: &Connection,
    employee_id: i64,
    as_of: NaiveDate,
) -> HrisResult<WageCompliance> {
    let employee = EmployeeRepository::new(conn).require(employee_id)?;
    check_employee(conn, &employee, as_of)
}

fn check_employee(
    conn: &Connection,
    employee: &Employee,
    as_of: NaiveDate,
) -> HrisResult<WageCompliance> {
    let region_code = employee
        .address
        .region_code
        .as_deref()
        .ok_or_else(|| HrisError::validation("region_code", "employee has no region on file"))?;
    let daily_rate = employee
        .daily_rate
        .ok_or_else(|| HrisError::validation("daily_rate", "employee has no daily rate on file"))?;

    let minimum = rate_for_region_on(conn, region_code, as_of)?;
    Ok(compare_to_minimum(employee.id, daily_rate, &minimum, as_of))
}
