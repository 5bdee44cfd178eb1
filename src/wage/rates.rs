//! Wage rate mutations and lookups.
//!
//! Every mutation runs in a transaction and re-runs activation for the
//! affected region(s) before committing, so the current flag never lags a
//! create, edit, delete or restore.

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::error::{HrisError, HrisResult};
use crate::models::{Actor, WageRate, WageRateInput, WageRateStatus};
use crate::repo::{WageRateQuery, WageRateRepository};

use super::activation::reactivate;

/// Creates a rate and re-activates its region.
///
/// # Arguments
///
/// * `conn` - Database connection
/// * `input` - The new rate
/// * `actor` - Who is creating it
/// * `today` - Local date used to decide which rate is current
///
/// # Returns
///
/// The stored rate, with `is_current` reflecting the activation result.
pub fn create_rate(
    conn: &Connection,
    input: &WageRateInput,
    actor: &Actor,
    today: NaiveDate,
) -> HrisResult<WageRate> {
    let tx = conn.unchecked_transaction()?;
    let repo = WageRateRepository::new(&tx);
    let id = repo.insert(input, actor)?;
    reactivate(&tx, input.region_code.trim(), today)?;
    let rate = repo.require(id)?;
    tx.commit()?;
    Ok(rate)
}

/// Updates a rate and re-activates both its old and new region.
pub fn update_rate(
    conn: &Connection,
    id: i64,
    input: &WageRateInput,
    actor: &Actor,
    today: NaiveDate,
) -> HrisResult<WageRate> {
    let tx = conn.unchecked_transaction()?;
    let repo = WageRateRepository::new(&tx);
    let existing = repo.require(id)?;
    repo.update(id, input, actor)?;

    let new_region = input.region_code.trim();
    if existing.region_code != new_region {
        reactivate(&tx, &existing.region_code, today)?;
    }
    reactivate(&tx, new_region, today)?;

    let rate = repo.require(id)?;
    tx.commit()?;
    Ok(rate)
}

/// Soft-deletes a rate. If it was current, the next eligible rate takes over.
pub fn delete_rate(conn: &Connection, id: i64, actor: &Actor, today: NaiveDate) -> HrisResult<()> {
    let tx = conn.unchecked_transaction()?;
    let repo = WageRateRepository::new(&tx);
    let existing = repo.require(id)?;
    repo.soft_delete(id, actor)?;
    reactivate(&tx, &existing.region_code, today)?;
    tx.commit()?;
    Ok(())
}

/// Restores a soft-deleted rate and re-activates its region.
pub fn restore_rate(
    conn: &Connection,
    id: i64,
    actor: &Actor,
    today: NaiveDate,
) -> HrisResult<WageRate> {
    let tx = conn.unchecked_transaction()?;
    let repo = WageRateRepository::new(&tx);
    let existing = repo
        .get(id, true)?
        .ok_or_else(|| HrisError::not_found("wage rate", id))?;
    if !existing.is_deleted {
        return Err(HrisError::conflict(format!("wage rate {id} is not deleted")));
    }
    repo.restore(id, actor)?;
    reactivate(&tx, &existing.region_code, today)?;
    let rate = repo.require(id)?;
    tx.commit()?;
    Ok(rate)
}

/// The rate in force for a region on `date`.
///
/// Works for past and future dates alike: it is the latest live rate whose
/// effective date is on or before `date`, independent of the current flag.
pub fn rate_for_region_on(
    conn: &Connection,
    region_code: &str,
    date: NaiveDate,
) -> HrisResult<WageRate> {
    WageRateRepository::new(conn)
        .latest_effective_on(region_code.trim(), date)?
        .ok_or_else(|| HrisError::not_found("wage rate", format!("{region_code} on {date}")))
}

/// Every rate currently flagged as in force, one per region.
pub fn current_rates(conn: &Connection, today: NaiveDate) -> HrisResult<Vec<WageRate>> {
    let query = WageRateQuery {
        status: Some(WageRateStatus::Current),
        ..Default::default()
    };
    WageRateRepository::new(conn).list(&query, today)
}
