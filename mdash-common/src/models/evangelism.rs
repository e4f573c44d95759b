//! Evangelism contacts and their follow-up

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A person reached during outreach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvangelismRecord {
    pub id: String,
    pub contact_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub evangelist: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /evangelism`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvangelismRecord {
    pub contact_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub evangelist: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewEvangelismRecord {
    pub fn validate(&self) -> Result<()> {
        if self.contact_name.trim().is_empty() {
            return Err(Error::InvalidInput("contact name is required".to_string()));
        }
        if self.evangelist.trim().is_empty() {
            return Err(Error::InvalidInput("evangelist is required".to_string()));
        }
        Ok(())
    }
}

/// Progress of a follow-up
///
/// `New -> Contacted -> Visited -> Integrated`, with `Unreachable` possible
/// from any state that is not already terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowUpStatus {
    New,
    Contacted,
    Visited,
    Integrated,
    Unreachable,
}

impl FollowUpStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, FollowUpStatus::Integrated | FollowUpStatus::Unreachable)
    }

    fn rank(self) -> Option<u8> {
        match self {
            FollowUpStatus::New => Some(0),
            FollowUpStatus::Contacted => Some(1),
            FollowUpStatus::Visited => Some(2),
            FollowUpStatus::Integrated => Some(3),
            FollowUpStatus::Unreachable => None,
        }
    }

    /// Forward moves along the main line (skipping allowed) or to
    /// `Unreachable`; nothing leaves a terminal state.
    pub fn can_transition_to(self, next: FollowUpStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), next.rank()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => false,
        }
    }
}

impl fmt::Display for FollowUpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for FollowUpStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(FollowUpStatus::New),
            "contacted" => Ok(FollowUpStatus::Contacted),
            "visited" => Ok(FollowUpStatus::Visited),
            "integrated" => Ok(FollowUpStatus::Integrated),
            "unreachable" => Ok(FollowUpStatus::Unreachable),
            other => Err(Error::InvalidInput(format!(
                "unknown follow-up status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub id: String,
    #[serde(default)]
    pub evangelism_id: Option<String>,
    pub contact_name: String,
    pub assigned_to: String,
    pub status: FollowUpStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl FollowUp {
    /// Reject updates that would move the status backwards or out of a
    /// terminal state
    pub fn check_update(&self, update: &FollowUpUpdate) -> Result<()> {
        if let Some(next) = update.status {
            if next != self.status && !self.status.can_transition_to(next) {
                return Err(Error::InvalidInput(format!(
                    "follow-up {} cannot move from {} to {}",
                    self.id, self.status, next
                )));
            }
        }
        if update.is_empty() {
            return Err(Error::InvalidInput("nothing to update".to_string()));
        }
        Ok(())
    }
}

/// Body of `PUT /follow-ups/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FollowUpStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl FollowUpUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.assigned_to.is_none() && self.notes.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn follow_up(status: FollowUpStatus) -> FollowUp {
        FollowUp {
            id: "f-1".to_string(),
            evangelism_id: Some("e-1".to_string()),
            contact_name: "Razak Okoya".to_string(),
            assigned_to: "Ada O.".to_string(),
            status,
            notes: None,
            updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_follow_up_moves_forward_only() {
        use FollowUpStatus::*;
        assert!(New.can_transition_to(Contacted));
        assert!(New.can_transition_to(Visited));
        assert!(Visited.can_transition_to(Integrated));
        assert!(!Visited.can_transition_to(Contacted));
        assert!(!Contacted.can_transition_to(Contacted));
    }

    #[test]
    fn test_unreachable_from_any_open_state() {
        use FollowUpStatus::*;
        for from in [New, Contacted, Visited] {
            assert!(from.can_transition_to(Unreachable), "{from} -> Unreachable");
        }
        assert!(!Integrated.can_transition_to(Unreachable));
        assert!(!Unreachable.can_transition_to(New));
    }

    #[test]
    fn test_check_update() {
        let open = follow_up(FollowUpStatus::Contacted);
        let notes_only = FollowUpUpdate {
            notes: Some("called twice".to_string()),
            ..Default::default()
        };
        assert!(open.check_update(&notes_only).is_ok());

        let backwards = FollowUpUpdate {
            status: Some(FollowUpStatus::New),
            ..Default::default()
        };
        assert!(open.check_update(&backwards).is_err());
        assert!(open.check_update(&FollowUpUpdate::default()).is_err());

        let done = follow_up(FollowUpStatus::Integrated);
        let reopen = FollowUpUpdate {
            status: Some(FollowUpStatus::Visited),
            ..Default::default()
        };
        assert!(done.check_update(&reopen).is_err());
    }

    #[test]
    fn test_new_record_requires_names() {
        let mut record = NewEvangelismRecord {
            contact_name: "Razak Okoya".to_string(),
            phone: None,
            location: Some("Market square".to_string()),
            evangelist: "Tunde B.".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            notes: None,
        };
        assert!(record.validate().is_ok());
        record.evangelist = "  ".to_string();
        assert!(record.validate().is_err());

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("phone").is_none());
        assert_eq!(json["contactName"], "Razak Okoya");
    }
}
