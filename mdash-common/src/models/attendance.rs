//! Attendance submission records

use crate::{AttendeeId, Error, Result, SubmissionId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A person named in a submission
///
/// Deserializes either from `{"id": "...", "name": "..."}` or, for backends
/// that still send bare names, from a plain string (the id is then derived
/// from the name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "AttendeeRepr")]
pub struct Attendee {
    pub id: AttendeeId,
    pub name: String,
}

impl Attendee {
    pub fn new(id: impl Into<AttendeeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Attendee known only by display name
    pub fn named(name: &str) -> Self {
        Self {
            id: AttendeeId::from_name(name),
            name: name.trim().to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AttendeeRepr {
    Name(String),
    Full { id: AttendeeId, name: String },
}

impl From<AttendeeRepr> for Attendee {
    fn from(repr: AttendeeRepr) -> Self {
        match repr {
            AttendeeRepr::Name(name) => Attendee::named(&name),
            AttendeeRepr::Full { id, name } => Attendee { id, name },
        }
    }
}

/// Review status of a submission
///
/// `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SubmissionStatus::Pending)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionStatus::Pending => "Pending",
            SubmissionStatus::Approved => "Approved",
            SubmissionStatus::Rejected => "Rejected",
        };
        f.write_str(s)
    }
}

impl FromStr for SubmissionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(SubmissionStatus::Pending),
            "approved" => Ok(SubmissionStatus::Approved),
            "rejected" => Ok(SubmissionStatus::Rejected),
            other => Err(Error::InvalidInput(format!(
                "unknown submission status '{}'",
                other
            ))),
        }
    }
}

/// One worker-filed report of who attended a meeting occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSubmission {
    pub id: SubmissionId,
    pub meeting_id: String,
    pub meeting_title: String,
    /// Comma-joined worker names
    pub submitted_by: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub participants: Vec<Attendee>,
    #[serde(default)]
    pub first_timers: Vec<Attendee>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

impl AttendanceSubmission {
    pub fn is_pending(&self) -> bool {
        self.status == SubmissionStatus::Pending
    }

    /// Worker names split out of `submitted_by`
    pub fn workers(&self) -> Vec<&str> {
        split_workers(&self.submitted_by)
    }

    /// Participants followed by first-timers
    pub fn attendees(&self) -> impl Iterator<Item = &Attendee> {
        self.participants.iter().chain(self.first_timers.iter())
    }

    pub fn attendee_count(&self) -> usize {
        self.participants.len() + self.first_timers.len()
    }

    pub fn contains(&self, id: &AttendeeId) -> bool {
        self.attendees().any(|a| &a.id == id)
    }

    /// Check that no attendee id repeats within or across the two lists
    pub fn validate(&self) -> Result<()> {
        match first_repeat(&self.participants, &self.first_timers) {
            Some(id) => Err(Error::InvalidInput(format!(
                "submission {} lists attendee {} more than once",
                self.id, id
            ))),
            None => Ok(()),
        }
    }
}

fn first_repeat<'a>(
    participants: &'a [Attendee],
    first_timers: &'a [Attendee],
) -> Option<&'a AttendeeId> {
    let mut seen = HashSet::with_capacity(participants.len() + first_timers.len());
    participants
        .iter()
        .chain(first_timers)
        .map(|a| &a.id)
        .find(|id| !seen.insert(*id))
}

/// Split a comma-joined worker list, dropping blanks
pub fn split_workers(submitted_by: &str) -> Vec<&str> {
    submitted_by
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Body of `POST /attendance/submissions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub meeting_id: String,
    pub meeting_title: String,
    pub submitted_by: String,
    pub date: NaiveDate,
    pub participants: Vec<Attendee>,
    pub first_timers: Vec<Attendee>,
}

impl NewSubmission {
    /// A report must name someone, and nobody twice
    pub fn validate(&self) -> Result<()> {
        if self.participants.is_empty() && self.first_timers.is_empty() {
            return Err(Error::InvalidInput("no attendees listed".to_string()));
        }
        if split_workers(&self.submitted_by).is_empty() {
            return Err(Error::InvalidInput("no worker named".to_string()));
        }
        match first_repeat(&self.participants, &self.first_timers) {
            Some(id) => Err(Error::InvalidInput(format!("attendee {} listed twice", id))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> AttendanceSubmission {
        AttendanceSubmission {
            id: SubmissionId::new("s-1"),
            meeting_id: "m-1".to_string(),
            meeting_title: "Sunday Service".to_string(),
            submitted_by: "Ada O., , Tunde B.".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            participants: vec![Attendee::named("Joy E."), Attendee::named("Kelechi U.")],
            first_timers: vec![Attendee::named("Razak Okoya")],
            status: SubmissionStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_attendee_accepts_bare_string_and_object() {
        let bare: Attendee = serde_json::from_str("\"Joy E.\"").unwrap();
        assert_eq!(bare, Attendee::named("Joy E."));

        let full: Attendee = serde_json::from_str(r#"{"id":"m-9","name":"Joy E."}"#).unwrap();
        assert_eq!(full.id, AttendeeId::new("m-9"));
        assert_ne!(full, bare);
    }

    #[test]
    fn test_submission_wire_format_is_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["meetingId"], "m-1");
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["date"], "2024-03-10");
        assert_eq!(json["firstTimers"][0]["name"], "Razak Okoya");
    }

    #[test]
    fn test_workers_skip_blank_entries() {
        assert_eq!(sample().workers(), vec!["Ada O.", "Tunde B."]);
    }

    #[test]
    fn test_validate_rejects_cross_list_duplicate() {
        let mut s = sample();
        assert!(s.validate().is_ok());
        s.first_timers.push(Attendee::named("Joy E."));
        assert!(matches!(s.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_new_submission_needs_attendees_and_a_worker() {
        let mut new = NewSubmission {
            meeting_id: "m-1".to_string(),
            meeting_title: "Sunday Service".to_string(),
            submitted_by: "Ada O.".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 17).unwrap(),
            participants: vec![Attendee::named("Joy E.")],
            first_timers: vec![],
        };
        assert!(new.validate().is_ok());

        new.first_timers.push(Attendee::named("Joy E. "));
        assert!(new.validate().is_err());

        new.first_timers.clear();
        new.submitted_by = " , ".to_string();
        assert!(new.validate().is_err());

        new.submitted_by = "Ada O.".to_string();
        new.participants.clear();
        assert!(new.validate().is_err());
    }

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        assert_eq!("approved".parse::<SubmissionStatus>().unwrap(), SubmissionStatus::Approved);
        assert_eq!(" Pending ".parse::<SubmissionStatus>().unwrap(), SubmissionStatus::Pending);
        assert!("done".parse::<SubmissionStatus>().is_err());
        assert!(SubmissionStatus::Rejected.is_terminal());
        assert!(!SubmissionStatus::Pending.is_terminal());
    }
}
