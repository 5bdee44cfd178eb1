//! Position model.

use serde::{Deserialize, Serialize};

use crate::error::HrisResult;

use super::AuditInfo;
use super::employee::require_non_empty;

/// A job position as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Database identifier.
    pub id: i64,
    /// Short code, unique among active positions.
    pub code: String,
    /// Job title.
    pub title: String,
    /// Owning organizational unit.
    pub org_unit_id: Option<i64>,
    /// Free-form description.
    pub description: Option<String>,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Audit columns.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Fields accepted when creating or updating a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionInput {
    /// Short code.
    pub code: String,
    /// Job title.
    pub title: String,
    /// Owning organizational unit.
    #[serde(default)]
    pub org_unit_id: Option<i64>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

impl PositionInput {
    /// Checks the fields that can be validated without the database.
    pub fn validate(&self) -> HrisResult<()> {
        require_non_empty("code", &self.code)?;
        require_non_empty("title", &self.title)
    }
}
