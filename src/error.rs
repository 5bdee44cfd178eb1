//! Error types for the HRIS service.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every error condition the service can hit, from configuration
//! loading through persistence to face matching and PSGC lookups.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the HRIS service.
///
/// All fallible operations return this error type so handlers can map
/// failures to HTTP responses in one place.
///
/// # Example
///
/// ```
/// use hris::error::HrisError;
///
/// let error = HrisError::NotFound {
///     entity: "employee".to_string(),
///     id: "42".to_string(),
/// };
/// assert_eq!(error.to_string(), "employee not found: 42");
/// ```
#[derive(Debug, Error)]
pub enum HrisError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The database rejected an operation.
    #[error("Database error: {message}")]
    Database {
        /// The driver's description of the failure.
        message: String,
    },

    /// A record was missing or soft-deleted.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record (e.g. "employee").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Input failed validation.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// The operation would violate a uniqueness or reference rule.
    #[error("Conflict: {message}")]
    Conflict {
        /// A description of the conflict.
        message: String,
    },

    /// Clocking was attempted for an employee without an enrolled face.
    #[error("No face descriptor enrolled for employee {employee_id}")]
    FaceNotEnrolled {
        /// The employee that tried to clock.
        employee_id: i64,
    },

    /// The captured descriptor was too far from the enrolled one.
    #[error("Face did not match (distance {distance:.4}, threshold {threshold})")]
    FaceMismatch {
        /// Euclidean distance between captured and enrolled descriptor.
        distance: f64,
        /// The configured match threshold.
        threshold: f64,
    },

    /// The employee already has both time-in and time-out for the day.
    #[error("Attendance for employee {employee_id} on {date} is already complete")]
    AttendanceComplete {
        /// The employee.
        employee_id: i64,
        /// The attendance date.
        date: NaiveDate,
    },

    /// A time-out came too soon after the time-in.
    #[error("Clock-out for employee {employee_id} is too soon; wait {minutes} minute(s) after time-in")]
    ClockTooSoon {
        /// The employee.
        employee_id: i64,
        /// The configured minimum interval.
        minutes: u32,
    },

    /// The PSGC upstream failed.
    #[error("Upstream error: {message}")]
    Upstream {
        /// A description of the failure.
        message: String,
    },

    /// The PSGC request budget for the current window is spent.
    #[error("Upstream rate limit reached ({limit} requests per minute)")]
    RateLimited {
        /// The configured request budget.
        limit: u32,
    },
}

impl HrisError {
    /// Shorthand for a [`HrisError::NotFound`].
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`HrisError::Validation`].
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`HrisError::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for HrisError {
    fn from(error: rusqlite::Error) -> Self {
        HrisError::Database {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for HrisError {
    fn from(error: serde_json::Error) -> Self {
        HrisError::Database {
            message: format!("invalid stored JSON: {error}"),
        }
    }
}

/// A type alias for Results that return HrisError.
pub type HrisResult<T> = Result<T, HrisError>;
