//! Regional minimum-wage rate model.
//!
//! A rate is issued by a wage order for a region and takes effect on a
//! date. At most one live rate per region is flagged current.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{HrisError, HrisResult};

use super::AuditInfo;
use super::employee::{is_psgc_code, require_non_empty};

/// Lifecycle state of a wage rate relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WageRateStatus {
    /// The rate in force for its region.
    Current,
    /// Effective date still in the future.
    Upcoming,
    /// Superseded (or back-dated) rate.
    Historical,
}

impl fmt::Display for WageRateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WageRateStatus::Current => "current",
            WageRateStatus::Upcoming => "upcoming",
            WageRateStatus::Historical => "historical",
        })
    }
}

impl FromStr for WageRateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(WageRateStatus::Current),
            "upcoming" => Ok(WageRateStatus::Upcoming),
            "historical" => Ok(WageRateStatus::Historical),
            other => Err(format!("unknown wage rate status: {other}")),
        }
    }
}

/// A minimum-wage rate as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WageRate {
    /// Database identifier.
    pub id: i64,
    /// PSGC code of the region the rate applies to.
    pub region_code: String,
    /// Region name as written in the wage order.
    pub region_name: String,
    /// Minimum daily wage.
    pub daily_rate: Decimal,
    /// Wage order reference (e.g. "NCR-25").
    pub wage_order: String,
    /// First day the rate applies.
    pub effective_date: NaiveDate,
    /// Whether this row is the region's rate in force.
    pub is_current: bool,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Audit columns.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl WageRate {
    /// Classifies the rate relative to `today`.
    ///
    /// ```
    /// use hris::models::{WageRate, WageRateStatus, AuditInfo};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
    /// let rate = WageRate {
    ///     id: 1,
    ///     region_code: "130000000".to_string(),
    ///     region_name: "NCR".to_string(),
    ///     daily_rate: Decimal::new(69500, 2),
    ///     wage_order: "NCR-26".to_string(),
    ///     effective_date: NaiveDate::from_ymd_opt(2025, 7, 18).unwrap(),
    ///     is_current: false,
    ///     is_deleted: false,
    ///     audit: AuditInfo {
    ///         created_by: "system".to_string(),
    ///         updated_by: None,
    ///         created_at: today.and_hms_opt(9, 0, 0).unwrap(),
    ///         updated_at: None,
    ///         deleted_at: None,
    ///     },
    /// };
    /// assert_eq!(rate.status(today), WageRateStatus::Upcoming);
    /// ```
    pub fn status(&self, today: NaiveDate) -> WageRateStatus {
        if self.is_current {
            WageRateStatus::Current
        } else if self.effective_date > today {
            WageRateStatus::Upcoming
        } else {
            WageRateStatus::Historical
        }
    }
}

/// Fields accepted when creating or updating a wage rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WageRateInput {
    /// PSGC region code.
    pub region_code: String,
    /// Region name as written in the wage order.
    pub region_name: String,
    /// Minimum daily wage.
    pub daily_rate: Decimal,
    /// Wage order reference.
    pub wage_order: String,
    /// First day the rate applies.
    pub effective_date: NaiveDate,
}

impl WageRateInput {
    /// Checks the fields that can be validated without the database.
    pub fn validate(&self) -> HrisResult<()> {
        require_non_empty("region_code", &self.region_code)?;
        if !is_psgc_code(&self.region_code) {
            return Err(HrisError::validation(
                "region_code",
                format!("'{}' is not a 9 or 10 digit PSGC code", self.region_code),
            ));
        }
        require_non_empty("region_name", &self.region_name)?;
        require_non_empty("wage_order", &self.wage_order)?;
        if self.daily_rate <= Decimal::ZERO {
            return Err(HrisError::validation(
                "daily_rate",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// A wage rate together with its status, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WageRateView {
    /// The stored rate.
    #[serde(flatten)]
    pub rate: WageRate,
    /// Status relative to the local date of the request.
    pub status: WageRateStatus,
}

impl WageRateView {
    /// Wraps a rate with its status on `today`.
    pub fn new(rate: WageRate, today: NaiveDate) -> Self {
        let status = rate.status(today);
        Self { rate, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> WageRateInput {
        WageRateInput {
            region_code: "130000000".to_string(),
            region_name: "National Capital Region".to_string(),
            daily_rate: Decimal::new(64500, 2),
            wage_order: "NCR-25".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2024, 7, 17).unwrap(),
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn test_zero_rate_rejected() {
        let mut input = input();
        input.daily_rate = Decimal::ZERO;
        match input.validate() {
            Err(HrisError::Validation { field, .. }) => assert_eq!(field, "daily_rate"),
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_wage_order_rejected() {
        let mut input = input();
        input.wage_order = " ".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_region_code_must_be_psgc() {
        let mut input = input();
        input.region_code = "NCR".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_status_parses_from_query_value() {
        assert_eq!("upcoming".parse(), Ok(WageRateStatus::Upcoming));
        assert!("pending".parse::<WageRateStatus>().is_err());
    }
}
