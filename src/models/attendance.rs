//! Attendance model.
//!
//! One live row per employee per day, holding the time-in and (once the
//! employee leaves) the time-out.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{HrisError, HrisResult};

use super::AuditInfo;

/// How an attendance row was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceMethod {
    /// Entered by HR staff.
    Manual,
    /// Recorded at a kiosk after a face match.
    Face,
}

impl AttendanceMethod {
    /// Returns the storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceMethod::Manual => "manual",
            AttendanceMethod::Face => "face",
        }
    }
}

impl fmt::Display for AttendanceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(AttendanceMethod::Manual),
            "face" => Ok(AttendanceMethod::Face),
            other => Err(format!("unknown attendance method: {other}")),
        }
    }
}

/// An attendance row as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    /// Database identifier.
    pub id: i64,
    /// The employee.
    pub employee_id: i64,
    /// Local calendar date of the time-in.
    pub attendance_date: NaiveDate,
    /// Local time-in.
    pub time_in: NaiveDateTime,
    /// Local time-out, once recorded.
    pub time_out: Option<NaiveDateTime>,
    /// How the row was recorded.
    pub method: AttendanceMethod,
    /// Face distance of the last face-verified clock event.
    pub match_distance: Option<f64>,
    /// Free-form remarks.
    pub remarks: Option<String>,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Audit columns.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl Attendance {
    /// Hours between time-in and time-out, rounded to 2 decimal places.
    ///
    /// Returns `None` until the employee has clocked out.
    pub fn worked_hours(&self) -> Option<Decimal> {
        let time_out = self.time_out?;
        let minutes = (time_out - self.time_in).num_minutes().max(0);
        Some((Decimal::new(minutes, 0) / Decimal::new(60, 0)).round_dp(2))
    }
}

/// An attendance row with its derived worked hours, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceView {
    /// The stored row.
    #[serde(flatten)]
    pub attendance: Attendance,
    /// Derived worked hours.
    pub worked_hours: Option<Decimal>,
}

impl From<Attendance> for AttendanceView {
    fn from(attendance: Attendance) -> Self {
        let worked_hours = attendance.worked_hours();
        Self {
            attendance,
            worked_hours,
        }
    }
}

/// Fields accepted for a manual attendance entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualAttendanceInput {
    /// The employee.
    pub employee_id: i64,
    /// Local time-in.
    pub time_in: NaiveDateTime,
    /// Local time-out.
    #[serde(default)]
    pub time_out: Option<NaiveDateTime>,
    /// Free-form remarks.
    #[serde(default)]
    pub remarks: Option<String>,
}

impl ManualAttendanceInput {
    /// Checks that time-out, if given, follows time-in.
    pub fn validate(&self) -> HrisResult<()> {
        if let Some(time_out) = self.time_out {
            if time_out <= self.time_in {
                return Err(HrisError::validation("time_out", "must be after time_in"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 5)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn attendance(time_out: Option<NaiveDateTime>) -> Attendance {
        Attendance {
            id: 1,
            employee_id: 10,
            attendance_date: at(8, 0).date(),
            time_in: at(8, 0),
            time_out,
            method: AttendanceMethod::Face,
            match_distance: Some(0.31),
            remarks: None,
            is_deleted: false,
            audit: AuditInfo {
                created_by: "kiosk".to_string(),
                updated_by: None,
                created_at: at(8, 0),
                updated_at: None,
                deleted_at: None,
            },
        }
    }

    #[test]
    fn test_worked_hours_none_until_clock_out() {
        assert_eq!(attendance(None).worked_hours(), None);
    }

    #[test]
    fn test_worked_hours_rounds_to_two_places() {
        // 08:00 to 17:10 is 9h10m
        let worked = attendance(Some(at(17, 10))).worked_hours().unwrap();
        assert_eq!(worked, Decimal::new(917, 2));
    }

    #[test]
    fn test_manual_time_out_before_time_in_rejected() {
        let input = ManualAttendanceInput {
            employee_id: 1,
            time_in: at(9, 0),
            time_out: Some(at(8, 0)),
            remarks: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_method_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AttendanceMethod::Face).unwrap(),
            "\"face\""
        );
    }
}
