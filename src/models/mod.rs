//! Core data models for the HRIS service.
//!
//! This module contains the domain records stored in the database and the
//! input types accepted by create and update operations.

mod attendance;
mod audit;
mod employee;
mod face;
mod organizational_unit;
mod position;
mod wage_rate;

pub use attendance::{Attendance, AttendanceMethod, AttendanceView, ManualAttendanceInput};
pub use audit::{Actor, AuditInfo, SYSTEM_ACTOR};
pub use employee::{Address, Employee, EmployeeInput, EmploymentStatus, is_psgc_code};
pub use face::{FaceData, FaceDescriptor};
pub use organizational_unit::{OrgUnitInput, OrgUnitNode, OrganizationalUnit, UnitType, build_tree};
pub use position::{Position, PositionInput};
pub use wage_rate::{WageRate, WageRateInput, WageRateStatus, WageRateView};
