//! Partial approval of attendance submissions
//!
//! A reviewer approves any subset of a pending submission's attendees. The
//! approved attendees move to a new `Approved` record and the rest stay on
//! the original record, which remains `Pending`. When everyone is approved
//! the original record is approved in place and no new record is created.
//!
//! Across the resulting record(s) every attendee of the input appears
//! exactly once.

use crate::{ReviewError, Selection};
use chrono::{DateTime, Utc};
use mdash_common::models::{AttendanceSubmission, Attendee, SubmissionStatus};
use mdash_common::SubmissionId;
use std::collections::BTreeSet;
use tracing::info;

/// Identity for a record created by a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fresh {
    pub id: SubmissionId,
    pub created_at: DateTime<Utc>,
}

impl Fresh {
    pub fn new(id: SubmissionId, created_at: DateTime<Utc>) -> Self {
        Self { id, created_at }
    }

    /// Random id, current time
    pub fn generate() -> Self {
        Self::new(SubmissionId::generate(), mdash_common::time::now())
    }
}

/// Result of reviewing a selection
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    /// Everyone was selected; the original record, now approved
    Approved(AttendanceSubmission),

    /// A strict subset was selected
    Split {
        /// New record holding the selected attendees
        approved: AttendanceSubmission,
        /// Original record holding the remainder, still pending
        residual: AttendanceSubmission,
    },
}

impl ReviewOutcome {
    pub fn records(&self) -> Vec<&AttendanceSubmission> {
        match self {
            ReviewOutcome::Approved(s) => vec![s],
            ReviewOutcome::Split { approved, residual } => vec![approved, residual],
        }
    }

    pub fn into_records(self) -> Vec<AttendanceSubmission> {
        match self {
            ReviewOutcome::Approved(s) => vec![s],
            ReviewOutcome::Split { approved, residual } => vec![approved, residual],
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self, ReviewOutcome::Split { .. })
    }
}

/// Approve the selected attendees of a pending submission
///
/// `fresh` is only used when the review produces a split.
///
/// # Errors
///
/// - `EmptySelection` if nothing is selected
/// - `NotPending` if the submission is already approved or rejected
/// - `InvalidSubmission` if an attendee is listed twice
/// - `NotInSubmission` if a selected id is not in the matching list
pub fn review_selection(
    submission: &AttendanceSubmission,
    selection: &Selection,
    fresh: Fresh,
) -> Result<ReviewOutcome, ReviewError> {
    if !submission.is_pending() {
        return Err(ReviewError::NotPending {
            id: submission.id.clone(),
            status: submission.status,
        });
    }
    submission
        .validate()
        .map_err(|e| ReviewError::InvalidSubmission {
            id: submission.id.clone(),
            reason: e.to_string(),
        })?;
    if selection.is_empty() {
        return Err(ReviewError::EmptySelection);
    }
    ensure_listed(submission, &submission.participants, &selection.participants)?;
    ensure_listed(submission, &submission.first_timers, &selection.first_timers)?;

    let (approved_participants, remaining_participants) =
        split_by(&submission.participants, &selection.participants);
    let (approved_first_timers, remaining_first_timers) =
        split_by(&submission.first_timers, &selection.first_timers);

    if remaining_participants.is_empty() && remaining_first_timers.is_empty() {
        info!(
            submission = %submission.id,
            attendees = submission.attendee_count(),
            "Submission fully approved"
        );
        let mut approved = submission.clone();
        approved.status = SubmissionStatus::Approved;
        return Ok(ReviewOutcome::Approved(approved));
    }

    info!(
        submission = %submission.id,
        new_record = %fresh.id,
        approved = approved_participants.len() + approved_first_timers.len(),
        remaining = remaining_participants.len() + remaining_first_timers.len(),
        "Submission partially approved"
    );

    let approved = AttendanceSubmission {
        id: fresh.id,
        participants: approved_participants,
        first_timers: approved_first_timers,
        status: SubmissionStatus::Approved,
        created_at: fresh.created_at,
        ..submission.clone()
    };
    let residual = AttendanceSubmission {
        participants: remaining_participants,
        first_timers: remaining_first_timers,
        status: SubmissionStatus::Pending,
        ..submission.clone()
    };

    Ok(ReviewOutcome::Split { approved, residual })
}

/// Reject the whole batch; attendee lists are left untouched
pub fn reject_batch(submission: &AttendanceSubmission) -> AttendanceSubmission {
    info!(submission = %submission.id, "Submission rejected");
    AttendanceSubmission {
        status: SubmissionStatus::Rejected,
        ..submission.clone()
    }
}

fn ensure_listed(
    submission: &AttendanceSubmission,
    listed: &[Attendee],
    selected: &BTreeSet<mdash_common::AttendeeId>,
) -> Result<(), ReviewError> {
    match selected
        .iter()
        .find(|id| !listed.iter().any(|a| &a.id == *id))
    {
        Some(missing) => Err(ReviewError::NotInSubmission {
            id: submission.id.clone(),
            attendee: missing.clone(),
        }),
        None => Ok(()),
    }
}

/// Stable split of `attendees` into (selected, remaining)
fn split_by(
    attendees: &[Attendee],
    selected: &BTreeSet<mdash_common::AttendeeId>,
) -> (Vec<Attendee>, Vec<Attendee>) {
    attendees
        .iter()
        .cloned()
        .partition(|a| selected.contains(&a.id))
}
