//! Face enrolment and attendance clocking.
//!
//! A kiosk sends the employee id and a live descriptor. The first accepted
//! clock of the local day opens the attendance row; the second closes it.

use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AttendanceConfig;
use crate::error::{HrisError, HrisResult};
use crate::models::{
    Actor, Attendance, AttendanceMethod, AttendanceView, Employee, FaceData, FaceDescriptor,
    ManualAttendanceInput,
};
use crate::repo::{AttendanceRepository, EmployeeRepository, FaceRepository, NewAttendance};

use super::distance::{FaceMatch, match_descriptor};

/// Which half of the day's attendance a clock filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockAction {
    /// Opened the day's row.
    TimeIn,
    /// Closed the day's row.
    TimeOut,
}

/// The result of an accepted clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockOutcome {
    /// What the clock recorded.
    pub action: ClockAction,
    /// The attendance row after the clock.
    pub attendance: AttendanceView,
    /// The face comparison that authorised it.
    pub face_match: FaceMatch,
}

/// Stores or replaces an employee's face descriptor.
pub fn enroll_face(
    conn: &Connection,
    employee_id: i64,
    descriptor: &FaceDescriptor,
    settings: &AttendanceConfig,
    actor: &Actor,
) -> HrisResult<FaceData> {
    descriptor.validate(settings.descriptor_length)?;
    require_active_employee(conn, employee_id)?;
    let data = FaceRepository::new(conn).upsert(employee_id, descriptor, actor)?;
    info!(employee_id, "Face descriptor enrolled");
    Ok(data)
}

/// Removes an employee's face descriptor.
pub fn remove_face(conn: &Connection, employee_id: i64) -> HrisResult<()> {
    FaceRepository::new(conn).delete(employee_id)?;
    info!(employee_id, "Face descriptor removed");
    Ok(())
}

/// Clocks an employee in or out after verifying their face.
///
/// # Arguments
///
/// * `conn` - Database connection
/// * `employee_id` - The employee at the kiosk
/// * `captured` - Descriptor captured at the kiosk
/// * `now` - Local time of the clock
/// * `settings` - Threshold, descriptor length and minimum interval
///
/// # Returns
///
/// The action taken and the updated row, or an error if:
/// - the employee is missing or inactive (`NotFound` / `Conflict`)
/// - no descriptor is enrolled (`FaceNotEnrolled`)
/// - the face does not match (`FaceMismatch`)
/// - the time-out would come too soon after the time-in (`ClockTooSoon`)
/// - both times are already recorded today (`AttendanceComplete`)
pub fn process_clock(
    conn: &Connection,
    employee_id: i64,
    captured: &FaceDescriptor,
    now: NaiveDateTime,
    settings: &AttendanceConfig,
) -> HrisResult<ClockOutcome> {
    captured.validate(settings.descriptor_length)?;
    let employee = require_active_employee(conn, employee_id)?;

    let enrolled = FaceRepository::new(conn)
        .get(employee_id)?
        .ok_or(HrisError::FaceNotEnrolled { employee_id })?;

    let face_match = match_descriptor(
        captured.as_slice(),
        enrolled.descriptor.as_slice(),
        settings.face_match_threshold,
    );
    if !face_match.matched {
        warn!(
            employee_id,
            distance = face_match.distance,
            threshold = face_match.threshold,
            "Face match rejected"
        );
        return Err(HrisError::FaceMismatch {
            distance: face_match.distance,
            threshold: face_match.threshold,
        });
    }

    let actor = Actor::new(employee.employee_number.clone(), now);
    let repo = AttendanceRepository::new(conn);
    let (action, attendance) = match repo.find_for_day(employee_id, now.date())? {
        None => {
            let row = repo.insert(
                &NewAttendance {
                    employee_id,
                    time_in: now,
                    time_out: None,
                    method: AttendanceMethod::Face,
                    match_distance: Some(face_match.distance),
                    remarks: None,
                },
                &actor,
            )?;
            (ClockAction::TimeIn, row)
        }
        Some(row) if row.time_out.is_none() => {
            ensure_interval_elapsed(&row, now, settings.min_clock_interval_minutes)?;
            let row = repo.set_time_out(row.id, now, Some(face_match.distance), &actor)?;
            (ClockAction::TimeOut, row)
        }
        Some(row) => {
            return Err(HrisError::AttendanceComplete {
                employee_id,
                date: row.attendance_date,
            });
        }
    };

    info!(
        employee_id,
        action = ?action,
        distance = face_match.distance,
        "Attendance clocked"
    );

    Ok(ClockOutcome {
        action,
        attendance: attendance.into(),
        face_match,
    })
}

/// Records an attendance row entered by HR.
pub fn record_manual_attendance(
    conn: &Connection,
    input: &ManualAttendanceInput,
    actor: &Actor,
) -> HrisResult<Attendance> {
    input.validate()?;
    require_active_employee(conn, input.employee_id)?;

    let remarks = input
        .remarks
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());
    AttendanceRepository::new(conn).insert(
        &NewAttendance {
            employee_id: input.employee_id,
            time_in: input.time_in,
            time_out: input.time_out,
            method: AttendanceMethod::Manual,
            match_distance: None,
            remarks,
        },
        actor,
    )
}

fn require_active_employee(conn: &Connection, employee_id: i64) -> HrisResult<Employee> {
    let employee = EmployeeRepository::new(conn).require(employee_id)?;
    if !employee.is_active() {
        return Err(HrisError::conflict(format!(
            "employee {employee_id} is {}",
            employee.employment_status
        )));
    }
    Ok(employee)
}

fn ensure_interval_elapsed(
    open: &Attendance,
    now: NaiveDateTime,
    min_minutes: u32,
) -> HrisResult<()> {
    let elapsed = (now - open.time_in).num_minutes();
    if elapsed < i64::from(min_minutes) {
        return Err(HrisError::ClockTooSoon {
            employee_id: open.employee_id,
            minutes: min_minutes,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_db_in_memory;
    use crate::models::{Address, EmployeeInput, EmploymentStatus};
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn settings() -> AttendanceConfig {
        AttendanceConfig {
            face_match_threshold: 0.6,
            descriptor_length: 4,
            min_clock_interval_minutes: 1,
        }
    }

    fn add_employee(conn: &Connection, number: &str, status: EmploymentStatus) -> i64 {
        let input = EmployeeInput {
            employee_number: number.to_string(),
            first_name: "Maria".to_string(),
            middle_name: None,
            last_name: "Santos".to_string(),
            suffix: None,
            email: None,
            phone: None,
            birth_date: None,
            hire_date: NaiveDate::from_ymd_opt(2020, 1, 6).unwrap(),
            employment_status: status,
            position_id: None,
            org_unit_id: None,
            address: Address::default(),
            daily_rate: Some(Decimal::new(69500, 2)),
        };
        EmployeeRepository::new(conn)
            .create(&input, &Actor::system(at(7, 0)))
            .unwrap()
            .id
    }

    fn enrolled() -> FaceDescriptor {
        FaceDescriptor(vec![0.1, 0.2, 0.3, 0.4])
    }

    fn setup() -> (Connection, i64) {
        let conn = open_db_in_memory().unwrap();
        let id = add_employee(&conn, "EMP-001", EmploymentStatus::Regular);
        enroll_face(&conn, id, &enrolled(), &settings(), &Actor::system(at(7, 0))).unwrap();
        (conn, id)
    }

    #[test]
    fn test_first_clock_is_time_in() {
        let (conn, id) = setup();

        let outcome = process_clock(&conn, id, &enrolled(), at(8, 0), &settings()).unwrap();

        assert_eq!(outcome.action, ClockAction::TimeIn);
        assert_eq!(outcome.attendance.attendance.time_in, at(8, 0));
        assert_eq!(outcome.attendance.attendance.method, AttendanceMethod::Face);
        assert!(outcome.face_match.matched);
    }

    #[test]
    fn test_second_clock_is_time_out() {
        let (conn, id) = setup();
        process_clock(&conn, id, &enrolled(), at(8, 0), &settings()).unwrap();

        let outcome = process_clock(&conn, id, &enrolled(), at(17, 30), &settings()).unwrap();

        assert_eq!(outcome.action, ClockAction::TimeOut);
        assert_eq!(outcome.attendance.attendance.time_out, Some(at(17, 30)));
        assert_eq!(outcome.attendance.worked_hours, Some(Decimal::new(950, 2)));
    }

    #[test]
    fn test_third_clock_is_rejected() {
        let (conn, id) = setup();
        process_clock(&conn, id, &enrolled(), at(8, 0), &settings()).unwrap();
        process_clock(&conn, id, &enrolled(), at(17, 0), &settings()).unwrap();

        assert!(matches!(
            process_clock(&conn, id, &enrolled(), at(18, 0), &settings()),
            Err(HrisError::AttendanceComplete { .. })
        ));
    }

    #[test]
    fn test_time_out_too_soon_is_rejected() {
        let (conn, id) = setup();
        process_clock(&conn, id, &enrolled(), at(8, 0), &settings()).unwrap();

        let again = at(8, 0) + Duration::seconds(30);
        assert!(matches!(
            process_clock(&conn, id, &enrolled(), again, &settings()),
            Err(HrisError::ClockTooSoon { minutes: 1, .. })
        ));
    }

    #[test]
    fn test_next_day_opens_new_row() {
        let (conn, id) = setup();
        process_clock(&conn, id, &enrolled(), at(8, 0), &settings()).unwrap();
        process_clock(&conn, id, &enrolled(), at(17, 0), &settings()).unwrap();

        let tomorrow = at(8, 0) + Duration::days(1);
        let outcome = process_clock(&conn, id, &enrolled(), tomorrow, &settings()).unwrap();

        assert_eq!(outcome.action, ClockAction::TimeIn);
    }

    #[test]
    fn test_different_face_is_rejected() {
        let (conn, id) = setup();
        let stranger = FaceDescriptor(vec![0.9, -0.4, 0.7, 0.0]);

        match process_clock(&conn, id, &stranger, at(8, 0), &settings()) {
            Err(HrisError::FaceMismatch { distance, threshold }) => {
                assert!(distance > threshold);
            }
            other => panic!("Expected FaceMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_clock_without_enrolment_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let id = add_employee(&conn, "EMP-002", EmploymentStatus::Probationary);

        assert!(matches!(
            process_clock(&conn, id, &enrolled(), at(8, 0), &settings()),
            Err(HrisError::FaceNotEnrolled { .. })
        ));
    }

    #[test]
    fn test_inactive_employee_cannot_clock() {
        let conn = open_db_in_memory().unwrap();
        let id = add_employee(&conn, "EMP-003", EmploymentStatus::Resigned);

        assert!(matches!(
            enroll_face(&conn, id, &enrolled(), &settings(), &Actor::system(at(7, 0))),
            Err(HrisError::Conflict { .. })
        ));
    }

    #[test]
    fn test_enrolment_checks_descriptor_length() {
        let conn = open_db_in_memory().unwrap();
        let id = add_employee(&conn, "EMP-004", EmploymentStatus::Regular);
        let short = FaceDescriptor(vec![0.1, 0.2]);

        assert!(matches!(
            enroll_face(&conn, id, &short, &settings(), &Actor::system(at(7, 0))),
            Err(HrisError::Validation { .. })
        ));
    }

    #[test]
    fn test_re_enrolment_replaces_descriptor() {
        let (conn, id) = setup();
        let updated = FaceDescriptor(vec![0.4, 0.3, 0.2, 0.1]);

        enroll_face(&conn, id, &updated, &settings(), &Actor::system(at(7, 30))).unwrap();

        let stored = FaceRepository::new(&conn).get(id).unwrap().unwrap();
        assert_eq!(stored.descriptor, updated);
    }

    #[test]
    fn test_manual_entry_for_missing_employee_fails() {
        let conn = open_db_in_memory().unwrap();
        let input = ManualAttendanceInput {
            employee_id: 999,
            time_in: at(8, 0),
            time_out: Some(at(17, 0)),
            remarks: None,
        };

        assert!(matches!(
            record_manual_attendance(&conn, &input, &Actor::system(at(18, 0))),
            Err(HrisError::NotFound { .. })
        ));
    }

    #[test]
    fn test_face_clock_closes_manual_time_in() {
        let (conn, id) = setup();
        let input = ManualAttendanceInput {
            employee_id: id,
            time_in: at(8, 0),
            time_out: None,
            remarks: Some("forgot badge".to_string()),
        };
        let row = record_manual_attendance(&conn, &input, &Actor::new("hr.admin", at(9, 0))).unwrap();
        assert_eq!(row.method, AttendanceMethod::Manual);
        assert_eq!(row.remarks.as_deref(), Some("forgot badge"));

        let outcome = process_clock(&conn, id, &enrolled(), at(17, 0), &settings()).unwrap();
        assert_eq!(outcome.action, ClockAction::TimeOut);
    }
}
