//! Face recognition attendance.
//!
//! Descriptors are computed client-side; the service only stores them and
//! compares a freshly captured descriptor against the enrolled vector by Euclidean distance.

mod clock;
mod distance;

pub use clock::{
    ClockAction, ClockOutcome, enroll_face, process_clock, record_manual_attendance, remove_face,
};
pub use distance::{
    DEFAULT_MATCH_THRESHOLD, DISTANCE_MISMATCH, FaceMatch, euclidean_distance, match_descriptor,
};
