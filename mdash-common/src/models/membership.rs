//! Membership directory: members and the units they belong to

use crate::AttendeeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnitKind {
    Fellowship,
    Cell,
}

/// An organizational grouping used for reporting breakdowns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    pub name: String,
    pub kind: UnitKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: AttendeeId,
    pub name: String,
    #[serde(default)]
    pub unit_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}
