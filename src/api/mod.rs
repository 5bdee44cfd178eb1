//! HTTP API module for the HRIS service.
//!
//! This module provides the REST API endpoints for employees, the
//! organizational structure, minimum-wage rates, attendance and the
//! PSGC location proxy.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{ClockRequest, FaceEnrollmentRequest};
pub use response::{ApiError, ApiErrorResponse};
pub use state::{ACTOR_HEADER, AppState};
