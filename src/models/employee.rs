//! Employee model and related types.
//!
//! This module defines the [`Employee`] record, its [`EmploymentStatus`]
//! and the [`EmployeeInput`] used for creates and updates.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{HrisError, HrisResult};

use super::AuditInfo;

/// Represents the employment status of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    /// On probation, typically the first six months.
    Probationary,
    /// Regular (permanent) employment.
    Regular,
    /// Fixed-term contract.
    Contractual,
    /// Engaged for a specific project.
    ProjectBased,
    /// Left voluntarily.
    Resigned,
    /// Employment ended by the company.
    Terminated,
}

impl EmploymentStatus {
    /// Returns the storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentStatus::Probationary => "probationary",
            EmploymentStatus::Regular => "regular",
            EmploymentStatus::Contractual => "contractual",
            EmploymentStatus::ProjectBased => "project_based",
            EmploymentStatus::Resigned => "resigned",
            EmploymentStatus::Terminated => "terminated",
        }
    }

    /// Returns true while the employee is still working for the company.
    ///
    /// ```
    /// use hris::models::EmploymentStatus;
    ///
    /// assert!(EmploymentStatus::Probationary.is_active());
    /// assert!(!EmploymentStatus::Resigned.is_active());
    /// ```
    pub fn is_active(&self) -> bool {
        !matches!(
            self,
            EmploymentStatus::Resigned | EmploymentStatus::Terminated
        )
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmploymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "probationary" => Ok(EmploymentStatus::Probationary),
            "regular" => Ok(EmploymentStatus::Regular),
            "contractual" => Ok(EmploymentStatus::Contractual),
            "project_based" => Ok(EmploymentStatus::ProjectBased),
            "resigned" => Ok(EmploymentStatus::Resigned),
            "terminated" => Ok(EmploymentStatus::Terminated),
            other => Err(format!("unknown employment status: {other}")),
        }
    }
}

/// Home address of an employee, keyed by PSGC codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// PSGC region code; also selects the applicable minimum wage.
    #[serde(default)]
    pub region_code: Option<String>,
    /// PSGC province code (absent for NCR).
    #[serde(default)]
    pub province_code: Option<String>,
    /// PSGC city/municipality code.
    #[serde(default)]
    pub city_code: Option<String>,
    /// PSGC barangay code.
    #[serde(default)]
    pub barangay_code: Option<String>,
    /// House number, street and subdivision.
    #[serde(default)]
    pub street_address: Option<String>,
}

impl Address {
    fn validate(&self) -> HrisResult<()> {
        let codes = [
            ("region_code", &self.region_code),
            ("province_code", &self.province_code),
            ("city_code", &self.city_code),
            ("barangay_code", &self.barangay_code),
        ];
        for (field, code) in codes {
            if let Some(code) = code {
                if !is_psgc_code(code) {
                    return Err(HrisError::validation(
                        field,
                        format!("'{code}' is not a 9 or 10 digit PSGC code"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Returns true for a 9-digit (legacy) or 10-digit PSGC code.
pub fn is_psgc_code(code: &str) -> bool {
    matches!(code.len(), 9 | 10) && code.bytes().all(|b| b.is_ascii_digit())
}

/// An employee record as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Database identifier.
    pub id: i64,
    /// Company-issued employee number, unique among active rows.
    pub employee_number: String,
    /// Given name.
    pub first_name: String,
    /// Middle name.
    pub middle_name: Option<String>,
    /// Family name.
    pub last_name: String,
    /// Name suffix (e.g. "Jr.").
    pub suffix: Option<String>,
    /// Work e-mail.
    pub email: Option<String>,
    /// Contact number.
    pub phone: Option<String>,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// First day of employment.
    pub hire_date: NaiveDate,
    /// Current employment status.
    pub employment_status: EmploymentStatus,
    /// Assigned position.
    pub position_id: Option<i64>,
    /// Assigned organizational unit.
    pub org_unit_id: Option<i64>,
    /// Home address.
    #[serde(flatten)]
    pub address: Address,
    /// Daily rate of pay.
    pub daily_rate: Option<Decimal>,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Audit columns.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl Employee {
    /// Returns "First M. Last Suffix" with the optional parts omitted when empty.
    pub fn full_name(&self) -> String {
        let mut parts = vec![self.first_name.clone()];
        if let Some(initial) = self
            .middle_name
            .as_deref()
            .and_then(|m| m.trim().chars().next())
        {
            parts.push(format!("{initial}."));
        }
        parts.push(self.last_name.clone());
        if let Some(suffix) = self.suffix.as_deref().filter(|s| !s.trim().is_empty()) {
            parts.push(suffix.to_string());
        }
        parts.join(" ")
    }

    /// Returns true if the record is live and the employee still works here.
    pub fn is_active(&self) -> bool {
        !self.is_deleted && self.employment_status.is_active()
    }
}

/// Fields accepted when creating or updating an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeInput {
    /// Company-issued employee number.
    pub employee_number: String,
    /// Given name.
    pub first_name: String,
    /// Middle name.
    #[serde(default)]
    pub middle_name: Option<String>,
    /// Family name.
    pub last_name: String,
    /// Name suffix.
    #[serde(default)]
    pub suffix: Option<String>,
    /// Work e-mail.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Date of birth.
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// First day of employment.
    pub hire_date: NaiveDate,
    /// Employment status.
    pub employment_status: EmploymentStatus,
    /// Assigned position.
    #[serde(default)]
    pub position_id: Option<i64>,
    /// Assigned organizational unit.
    #[serde(default)]
    pub org_unit_id: Option<i64>,
    /// Home address.
    #[serde(flatten)]
    pub address: Address,
    /// Daily rate of pay.
    #[serde(default)]
    pub daily_rate: Option<Decimal>,
}

impl EmployeeInput {
    /// Checks the fields that can be validated without the database.
    pub fn validate(&self) -> HrisResult<()> {
        require_non_empty("employee_number", &self.employee_number)?;
        require_non_empty("first_name", &self.first_name)?;
        require_non_empty("last_name", &self.last_name)?;

        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            if !is_plausible_email(email) {
                return Err(HrisError::validation(
                    "email",
                    format!("'{email}' is not a valid e-mail address"),
                ));
            }
        }

        if let Some(birth_date) = self.birth_date {
            if birth_date >= self.hire_date {
                return Err(HrisError::validation(
                    "birth_date",
                    "must be before the hire date",
                ));
            }
        }

        if let Some(rate) = self.daily_rate {
            if rate.is_sign_negative() {
                return Err(HrisError::validation("daily_rate", "cannot be negative"));
            }
        }

        self.address.validate()
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> HrisResult<()> {
    if value.trim().is_empty() {
        return Err(HrisError::validation(field, "is required"));
    }
    Ok(())
}

/// Accepts `local@domain.tld` with no whitespace.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> EmployeeInput {
        EmployeeInput {
            employee_number: "EMP-0001".to_string(),
            first_name: "Maria".to_string(),
            middle_name: Some("Santos".to_string()),
            last_name: "Dela Cruz".to_string(),
            suffix: None,
            email: Some("maria.delacruz@example.ph".to_string()),
            phone: None,
            birth_date: NaiveDate::from_ymd_opt(1990, 4, 12),
            hire_date: NaiveDate::from_ymd_opt(2021, 1, 4).unwrap(),
            employment_status: EmploymentStatus::Regular,
            position_id: None,
            org_unit_id: None,
            address: Address {
                region_code: Some("130000000".to_string()),
                ..Address::default()
            },
            daily_rate: Some(Decimal::new(64500, 2)),
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_blank_last_name_rejected() {
        let mut input = valid_input();
        input.last_name = "  ".to_string();
        match input.validate() {
            Err(HrisError::Validation { field, .. }) => assert_eq!(field, "last_name"),
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_email_rejected() {
        for email in ["maria", "maria@", "@example.ph", "maria@example", "a b@x.ph"] {
            let mut input = valid_input();
            input.email = Some(email.to_string());
            assert!(input.validate().is_err(), "{email} should be rejected");
        }
    }

    #[test]
    fn test_birth_date_after_hire_date_rejected() {
        let mut input = valid_input();
        input.birth_date = NaiveDate::from_ymd_opt(2022, 1, 1);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_negative_daily_rate_rejected() {
        let mut input = valid_input();
        input.daily_rate = Some(Decimal::new(-1, 0));
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_non_numeric_psgc_code_rejected() {
        let mut input = valid_input();
        input.address.city_code = Some("13740A000".to_string());
        match input.validate() {
            Err(HrisError::Validation { field, .. }) => assert_eq!(field, "city_code"),
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_employment_status_round_trips_through_str() {
        for status in [
            EmploymentStatus::Probationary,
            EmploymentStatus::Regular,
            EmploymentStatus::Contractual,
            EmploymentStatus::ProjectBased,
            EmploymentStatus::Resigned,
            EmploymentStatus::Terminated,
        ] {
            assert_eq!(status.as_str().parse::<EmploymentStatus>(), Ok(status));
        }
        assert!("retired".parse::<EmploymentStatus>().is_err());
    }

    #[test]
    fn test_deserialize_input_with_flattened_address() {
        let json = r#"{
            "employee_number": "EMP-0002",
            "first_name": "Jose",
            "last_name": "Rizal",
            "hire_date": "2024-02-01",
            "employment_status": "probationary",
            "region_code": "040000000",
            "daily_rate": "560.00"
        }"#;

        let input: EmployeeInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.address.region_code.as_deref(), Some("040000000"));
        assert_eq!(input.daily_rate, Some(Decimal::new(56000, 2)));
        assert_eq!(input.employment_status, EmploymentStatus::Probationary);
    }
}
