//! Audit columns shared by every HRIS table.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The user name recorded when a request carries no `X-HRIS-User` header.
pub const SYSTEM_ACTOR: &str = "system";

/// Who performed a mutation and when, in company local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The acting user.
    pub user: String,
    /// Local timestamp of the mutation.
    pub at: NaiveDateTime,
}

impl Actor {
    /// Creates an actor, falling back to [`SYSTEM_ACTOR`] for a blank name.
    pub fn new(user: impl Into<String>, at: NaiveDateTime) -> Self {
        let user = user.into();
        let user = if user.trim().is_empty() {
            SYSTEM_ACTOR.to_string()
        } else {
            user.trim().to_string()
        };
        Self { user, at }
    }

    /// Creates an actor for scheduled work.
    pub fn system(at: NaiveDateTime) -> Self {
        Self::new(SYSTEM_ACTOR, at)
    }
}

/// Creation, update and soft-delete bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditInfo {
    /// User who created the row.
    pub created_by: String,
    /// User who last updated the row.
    pub updated_by: Option<String>,
    /// When the row was created.
    pub created_at: NaiveDateTime,
    /// When the row was last updated.
    pub updated_at: Option<NaiveDateTime>,
    /// When the row was soft-deleted.
    pub deleted_at: Option<NaiveDateTime>,
}
