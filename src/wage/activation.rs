//! Minimum-wage rate activation.
//!
//! A region's current rate is the live rate with the latest effective date
//! on or before today. Activation recomputes that choice and rewrites the
//! `is_current` flags so at most one row per region carries it.
//!
//! The daily run is gated by a flag file holding the date of the last run,
//! so the background ticker can fire as often as it likes.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::HrisResult;
use crate::repo::WageRateRepository;

/// A rate that became current during an activation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedRate {
    /// The region whose current rate changed.
    pub region_code: String,
    /// The rate that is now current.
    pub rate_id: i64,
    /// The rate it replaced, if the region had one.
    pub previous_rate_id: Option<i64>,
}

/// The result of a daily activation check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActivationOutcome {
    /// The flag file shows activation already ran today.
    Skipped {
        /// Date recorded in the flag file.
        last_run: NaiveDate,
    },
    /// Activation ran.
    Ran {
        /// The date activation ran for.
        date: NaiveDate,
        /// Rates that became current.
        activated: Vec<ActivatedRate>,
    },
}

/// Recomputes the current rate of one region in its own transaction.
///
/// Returns the rate that newly became current, or `None` when the current
/// rate did not change (including when the region lost its current rate
/// because every remaining row is in the future).
pub fn activate_region(
    conn: &Connection,
    region_code: &str,
    today: NaiveDate,
) -> HrisResult<Option<ActivatedRate>> {
    let tx = conn.unchecked_transaction()?;
    let activated = reactivate(&tx, region_code, today)?;
    tx.commit()?;
    Ok(activated)
}

/// The body of [`activate_region`], for callers already inside a transaction.
pub(super) fn reactivate(
    conn: &Connection,
    region_code: &str,
    today: NaiveDate,
) -> HrisResult<Option<ActivatedRate>> {
    let repo = WageRateRepository::new(conn);
    let previous = repo.current_for_region(region_code)?.map(|r| r.id);
    let candidate = repo.latest_effective_on(region_code, today)?.map(|r| r.id);

    let changed = repo.set_current(region_code, candidate)?;
    if changed == 0 || candidate == previous {
        return Ok(None);
    }

    Ok(candidate.map(|rate_id| {
        info!(
            region_code = %region_code,
            rate_id,
            previous_rate_id = ?previous,
            "Minimum wage rate activated"
        );
        ActivatedRate {
            region_code: region_code.to_string(),
            rate_id,
            previous_rate_id: previous,
        }
    }))
}

/// Recomputes the current rate of every region in one transaction.
pub fn activate_all(conn: &Connection, today: NaiveDate) -> HrisResult<Vec<ActivatedRate>> {
    let tx = conn.unchecked_transaction()?;
    let regions = WageRateRepository::new(&tx).region_codes()?;

    let mut activated = Vec::new();
    for region_code in regions {
        if let Some(rate) = reactivate(&tx, &region_code, today)? {
            activated.push(rate);
        }
    }

    tx.commit()?;
    Ok(activated)
}

/// Runs [`activate_all`] at most once per day, as recorded in `flag_path`.
///
/// A missing, unreadable or malformed flag file counts as "never ran".
/// Failing to write the flag afterwards is logged but does not undo the
/// activation; the next check will simply run again.
pub fn run_daily_activation(
    conn: &Connection,
    flag_path: &Path,
    today: NaiveDate,
) -> HrisResult<ActivationOutcome> {
    if let Some(last_run) = read_flag(flag_path) {
        if last_run == today {
            return Ok(ActivationOutcome::Skipped { last_run });
        }
    }

    let activated = activate_all(conn, today)?;
    info!(
        date = %today,
        activated = activated.len(),
        "Daily minimum wage activation completed"
    );

    if let Err(err) = write_flag(flag_path, today) {
        warn!(
            path = %flag_path.display(),
            error = %err,
            "Failed to record wage activation flag"
        );
    }

    Ok(ActivationOutcome::Ran {
        date: today,
        activated,
    })
}

fn read_flag(flag_path: &Path) -> Option<NaiveDate> {
    let content = fs::read_to_string(flag_path).ok()?;
    NaiveDate::parse_from_str(content.trim(), "%Y-%m-%d").ok()
}

fn write_flag(flag_path: &Path, today: NaiveDate) -> std::io::Result<()> {
    if let Some(parent) = flag_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(flag_path, format!("{today}\n"))
}
