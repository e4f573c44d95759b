//! Prayer-group sessions

use super::Attendee;
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerSession {
    pub id: String,
    pub group_id: String,
    pub leader: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl PrayerSession {
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Close the session at `at`
    pub fn end(&mut self, at: DateTime<Utc>) -> Result<()> {
        if let Some(ended) = self.ended_at {
            return Err(Error::InvalidInput(format!(
                "prayer session {} already ended at {}",
                self.id, ended
            )));
        }
        if at < self.started_at {
            return Err(Error::InvalidInput(format!(
                "prayer session {} cannot end before it started",
                self.id
            )));
        }
        self.ended_at = Some(at);
        Ok(())
    }

    /// Length of a closed session
    pub fn duration(&self) -> Option<Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }
}

/// Body of `POST /prayer-groups/sessions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrayerSession {
    pub group_id: String,
    pub leader: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Body of `POST /prayer-groups/sessions/{id}/end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndPrayerSession {
    pub ended_at: DateTime<Utc>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}
