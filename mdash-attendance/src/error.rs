//! Error types for the review workflow

use mdash_common::models::SubmissionStatus;
use mdash_common::{AttendeeId, SubmissionId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    /// Approve was requested with nobody selected
    #[error("Select at least one attendee before approving")]
    EmptySelection,

    /// The submission has already been approved or rejected
    #[error("Submission {id} is {status}, only pending submissions can be reviewed")]
    NotPending {
        id: SubmissionId,
        status: SubmissionStatus,
    },

    /// A selected attendee is not listed in the submission (or is listed in
    /// the other list)
    #[error("Attendee {attendee} is not listed in submission {id}")]
    NotInSubmission {
        id: SubmissionId,
        attendee: AttendeeId,
    },

    /// The submission lists the same attendee more than once
    #[error("Submission {id} cannot be reviewed: {reason}")]
    InvalidSubmission { id: SubmissionId, reason: String },

    #[error("Unknown submission: {0}")]
    UnknownSubmission(SubmissionId),

    /// An action needs an open submission and none is open
    #[error("No submission is open for review")]
    NothingOpen,

    /// A previous review action is still being saved
    #[error("A review action is still being saved")]
    Busy,
}
