//! The reviewer's selection of attendees within one submission

use mdash_common::models::AttendanceSubmission;
use mdash_common::AttendeeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Chosen participants and first-timers, by id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub participants: BTreeSet<AttendeeId>,
    pub first_timers: BTreeSet<AttendeeId>,
}

impl Selection {
    pub fn new(
        participants: impl IntoIterator<Item = AttendeeId>,
        first_timers: impl IntoIterator<Item = AttendeeId>,
    ) -> Self {
        Self {
            participants: participants.into_iter().collect(),
            first_timers: first_timers.into_iter().collect(),
        }
    }

    /// Every attendee of `submission`
    pub fn full(submission: &AttendanceSubmission) -> Self {
        Self::new(
            submission.participants.iter().map(|a| a.id.clone()),
            submission.first_timers.iter().map(|a| a.id.clone()),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty() && self.first_timers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.participants.len() + self.first_timers.len()
    }

    pub fn clear(&mut self) {
        self.participants.clear();
        self.first_timers.clear();
    }

    /// Flip a participant in or out; returns whether it is now selected
    pub fn toggle_participant(&mut self, id: &AttendeeId) -> bool {
        toggle(&mut self.participants, id)
    }

    /// Flip a first-timer in or out; returns whether it is now selected
    pub fn toggle_first_timer(&mut self, id: &AttendeeId) -> bool {
        toggle(&mut self.first_timers, id)
    }

    /// Drop ids that `submission` no longer lists
    pub fn retain_listed(&mut self, submission: &AttendanceSubmission) {
        self.participants
            .retain(|id| submission.participants.iter().any(|a| &a.id == id));
        self.first_timers
            .retain(|id| submission.first_timers.iter().any(|a| &a.id == id));
    }
}

fn toggle(set: &mut BTreeSet<AttendeeId>, id: &AttendeeId) -> bool {
    if set.remove(id) {
        false
    } else {
        set.insert(id.clone());
        true
    }
}

/// Select everyone, or clear the selection if everyone is already selected
pub fn toggle_select_all(submission: &AttendanceSubmission, current: &Selection) -> Selection {
    let full = Selection::full(submission);
    if *current == full {
        Selection::default()
    } else {
        full
    }
}
