//! View state of the attendance review screen
//!
//! All state lives in one serializable [`ReviewState`] and changes only
//! through [`ReviewState::apply`]. Backend work is not performed here: `apply`
//! returns the [`Effect`]s the caller must carry out, and the caller feeds
//! the outcome back as another action.
//!
//! The in-memory list is updated before the backend is contacted. If a save
//! fails the list is re-fetched rather than rolled back. A split is saved as
//! two writes; if either fails, the pre-call copy of the original record is
//! written back before the re-fetch so the backend never keeps half a split.

use crate::partition::{reject_batch, review_selection, Fresh, ReviewOutcome};
use crate::selection::{toggle_select_all, Selection};
use crate::ReviewError;
use mdash_common::models::{AttendanceSubmission, SubmissionStatus};
use mdash_common::{AttendeeId, SubmissionId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    pub submissions: Vec<AttendanceSubmission>,
    /// Only show submissions with this status
    pub filter: Option<SubmissionStatus>,
    /// Submission currently open for review
    pub open: Option<SubmissionId>,
    pub selection: Selection,
    /// A save is in flight
    pub busy: bool,
    /// Message shown above the list until dismissed
    pub banner: Option<String>,
    /// Pre-call copy of a record whose split is being saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore: Option<AttendanceSubmission>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewAction {
    /// Fresh list from the backend
    Loaded(Vec<AttendanceSubmission>),
    Open(SubmissionId),
    Close,
    ToggleParticipant(AttendeeId),
    ToggleFirstTimer(AttendeeId),
    ToggleSelectAll,
    /// Replace the selection wholesale
    Select(Selection),
    SetFilter(Option<SubmissionStatus>),
    /// Approve the current selection; `Fresh` names the record a split
    /// would create
    ApproveSelection(Fresh),
    RejectOpen,
    PersistSucceeded,
    PersistFailed(String),
    DismissBanner,
    SessionExpired,
}

/// Work the caller must perform after an action
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Create or update this record on the backend
    Upsert(AttendanceSubmission),
    /// Persist rejection of this submission
    Reject(SubmissionId),
    /// Reload the list from the backend
    Refetch,
    /// Clear stored credentials and return to the login screen
    Logout,
}

impl ReviewState {
    pub fn new(submissions: Vec<AttendanceSubmission>) -> Self {
        Self {
            submissions,
            ..Default::default()
        }
    }

    /// Submissions passing the current filter
    pub fn visible(&self) -> Vec<&AttendanceSubmission> {
        self.submissions
            .iter()
            .filter(|s| self.filter.map_or(true, |f| s.status == f))
            .collect()
    }

    pub fn get(&self, id: &SubmissionId) -> Option<&AttendanceSubmission> {
        self.submissions.iter().find(|s| &s.id == id)
    }

    pub fn open_submission(&self) -> Option<&AttendanceSubmission> {
        self.open.as_ref().and_then(|id| self.get(id))
    }

    /// Whether the approve control should be enabled
    pub fn can_approve(&self) -> bool {
        !self.busy
            && !self.selection.is_empty()
            && self.open_submission().is_some_and(|s| s.is_pending())
    }

    /// Whether the reject control should be enabled
    pub fn can_reject(&self) -> bool {
        !self.busy && self.open_submission().is_some_and(|s| s.is_pending())
    }

    pub fn apply(&mut self, action: ReviewAction) -> Result<Vec<Effect>, ReviewError> {
        debug!(?action, "Review action");
        match action {
            ReviewAction::Loaded(submissions) => {
                for submission in &submissions {
                    if let Err(e) = submission.validate() {
                        warn!("Loaded an inconsistent submission: {}", e);
                    }
                }
                self.submissions = submissions;
                self.busy = false;
                self.resync_open();
                Ok(vec![])
            }
            ReviewAction::Open(id) => {
                let submission = self
                    .get(&id)
                    .ok_or_else(|| ReviewError::UnknownSubmission(id.clone()))?;
                if !submission.is_pending() {
                    return Err(ReviewError::NotPending {
                        id,
                        status: submission.status,
                    });
                }
                self.open = Some(id);
                self.selection.clear();
                Ok(vec![])
            }
            ReviewAction::Close => {
                self.close();
                Ok(vec![])
            }
            ReviewAction::ToggleParticipant(attendee) => {
                let submission = self.require_open()?;
                if !submission.participants.iter().any(|a| a.id == attendee) {
                    return Err(ReviewError::NotInSubmission {
                        id: submission.id.clone(),
                        attendee,
                    });
                }
                self.selection.toggle_participant(&attendee);
                Ok(vec![])
            }
            ReviewAction::ToggleFirstTimer(attendee) => {
                let submission = self.require_open()?;
                if !submission.first_timers.iter().any(|a| a.id == attendee) {
                    return Err(ReviewError::NotInSubmission {
                        id: submission.id.clone(),
                        attendee,
                    });
                }
                self.selection.toggle_first_timer(&attendee);
                Ok(vec![])
            }
            ReviewAction::ToggleSelectAll => {
                let next = toggle_select_all(self.require_open()?, &self.selection);
                self.selection = next;
                Ok(vec![])
            }
            ReviewAction::Select(selection) => {
                self.require_open()?;
                self.selection = selection;
                Ok(vec![])
            }
            ReviewAction::SetFilter(filter) => {
                self.filter = filter;
                Ok(vec![])
            }
            ReviewAction::ApproveSelection(fresh) => self.approve(fresh),
            ReviewAction::RejectOpen => self.reject(),
            ReviewAction::PersistSucceeded => {
                self.busy = false;
                self.restore = None;
                Ok(vec![])
            }
            ReviewAction::PersistFailed(message) => {
                warn!(%message, "Saving review failed, reloading submissions");
                self.busy = false;
                self.banner = Some(message);
                match self.restore.take() {
                    Some(original) => {
                        warn!(submission = %original.id, "Writing back the unsplit record");
                        Ok(vec![Effect::Upsert(original), Effect::Refetch])
                    }
                    None => Ok(vec![Effect::Refetch]),
                }
            }
            ReviewAction::DismissBanner => {
                self.banner = None;
                Ok(vec![])
            }
            ReviewAction::SessionExpired => {
                *self = ReviewState {
                    banner: Some(SESSION_EXPIRED_MESSAGE.to_string()),
                    ..Default::default()
                };
                Ok(vec![Effect::Logout])
            }
        }
    }

    fn approve(&mut self, fresh: Fresh) -> Result<Vec<Effect>, ReviewError> {
        if self.busy {
            return Err(ReviewError::Busy);
        }
        let submission = self.require_open()?;
        let outcome = review_selection(submission, &self.selection, fresh)?;
        let original = submission.clone();
        let index = self.index_of_open()?;

        // Residual first: a half-saved split then misses the selected
        // attendees instead of listing them twice, and `restore` puts them back.
        let effects = match outcome {
            ReviewOutcome::Approved(approved) => {
                self.submissions[index] = approved.clone();
                self.close();
                vec![Effect::Upsert(approved)]
            }
            ReviewOutcome::Split { approved, residual } => {
                self.submissions[index] = residual.clone();
                self.submissions.insert(index + 1, approved.clone());
                self.selection.clear();
                self.restore = Some(original);
                vec![Effect::Upsert(residual), Effect::Upsert(approved)]
            }
        };
        self.busy = true;
        Ok(effects)
    }

    fn reject(&mut self) -> Result<Vec<Effect>, ReviewError> {
        if self.busy {
            return Err(ReviewError::Busy);
        }
        let submission = self.require_open()?;
        if !submission.is_pending() {
            return Err(ReviewError::NotPending {
                id: submission.id.clone(),
                status: submission.status,
            });
        }
        let rejected = reject_batch(submission);
        let index = self.index_of_open()?;
        let id = rejected.id.clone();
        self.submissions[index] = rejected;
        self.close();
        self.busy = true;
        Ok(vec![Effect::Reject(id)])
    }

    fn require_open(&self) -> Result<&AttendanceSubmission, ReviewError> {
        let id = self.open.as_ref().ok_or(ReviewError::NothingOpen)?;
        self.get(id)
            .ok_or_else(|| ReviewError::UnknownSubmission(id.clone()))
    }

    fn index_of_open(&self) -> Result<usize, ReviewError> {
        let id = self.open.as_ref().ok_or(ReviewError::NothingOpen)?;
        self.submissions
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| ReviewError::UnknownSubmission(id.clone()))
    }

    fn close(&mut self) {
        self.open = None;
        self.selection.clear();
    }

    /// After a reload, keep the open submission only if it is still pending
    fn resync_open(&mut self) {
        let still_open = self
            .open_submission()
            .filter(|s| s.is_pending())
            .cloned();
        match still_open {
            Some(submission) => self.selection.retain_listed(&submission),
            None => self.close(),
        }
    }
}
