//! Organizational unit model.
//!
//! Units form a tree (division → department → section → …) through
//! `parent_id`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HrisResult;

use super::AuditInfo;
use super::employee::require_non_empty;

/// The level of an organizational unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    /// Top-level grouping.
    Division,
    /// Department within a division.
    Department,
    /// Section within a department.
    Section,
    /// Smallest working team.
    Unit,
    /// Geographically separate office.
    Branch,
}

impl UnitType {
    /// Returns the storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Division => "division",
            UnitType::Department => "department",
            UnitType::Section => "section",
            UnitType::Unit => "unit",
            UnitType::Branch => "branch",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "division" => Ok(UnitType::Division),
            "department" => Ok(UnitType::Department),
            "section" => Ok(UnitType::Section),
            "unit" => Ok(UnitType::Unit),
            "branch" => Ok(UnitType::Branch),
            other => Err(format!("unknown unit type: {other}")),
        }
    }
}

/// An organizational unit as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationalUnit {
    /// Database identifier.
    pub id: i64,
    /// Short code, unique among active units.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Level in the hierarchy.
    pub unit_type: UnitType,
    /// Parent unit, `None` for roots.
    pub parent_id: Option<i64>,
    /// Free-form description.
    pub description: Option<String>,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Audit columns.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Fields accepted when creating or updating a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgUnitInput {
    /// Short code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Level in the hierarchy.
    pub unit_type: UnitType,
    /// Parent unit.
    #[serde(default)]
    pub parent_id: Option<i64>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

impl OrgUnitInput {
    /// Checks the fields that can be validated without the database.
    pub fn validate(&self) -> HrisResult<()> {
        require_non_empty("code", &self.code)?;
        require_non_empty("name", &self.name)
    }
}

/// A unit with its nested children, for tree views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgUnitNode {
    /// The unit itself.
    #[serde(flatten)]
    pub unit: OrganizationalUnit,
    /// Child units, ordered by name.
    pub children: Vec<OrgUnitNode>,
}

/// Builds a forest from a flat list of units.
///
/// Units whose parent is absent from `units` (e.g. a deleted parent) are
/// treated as roots. Siblings are ordered by name, then id.
pub fn build_tree(units: Vec<OrganizationalUnit>) -> Vec<OrgUnitNode> {
    let known: std::collections::HashSet<i64> = units.iter().map(|u| u.id).collect();
    let mut by_parent: HashMap<Option<i64>, Vec<OrganizationalUnit>> = HashMap::new();

    for unit in units {
        let parent = unit.parent_id.filter(|p| known.contains(p));
        by_parent.entry(parent).or_default().push(unit);
    }

    fn attach(
        parent: Option<i64>,
        by_parent: &mut HashMap<Option<i64>, Vec<OrganizationalUnit>>,
    ) -> Vec<OrgUnitNode> {
        let mut children = by_parent.remove(&parent).unwrap_or_default();
        children.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        children
            .into_iter()
            .map(|unit| {
                let id = unit.id;
                OrgUnitNode {
                    unit,
                    children: attach(Some(id), by_parent),
                }
            })
            .collect()
    }

    attach(None, &mut by_parent)
}
