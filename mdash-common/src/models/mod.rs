//! Request/response schemas of the backend API
//!
//! Field names are camelCase on the wire.

mod attendance;
mod auth;
mod evangelism;
mod meeting;
mod membership;
mod prayer;
mod study;

pub use attendance::{
    split_workers, AttendanceSubmission, Attendee, NewSubmission, SubmissionStatus,
};
pub use auth::{ApiErrorBody, LoginRequest, LoginResponse, UserProfile};
pub use evangelism::{
    EvangelismRecord, FollowUp, FollowUpStatus, FollowUpUpdate, NewEvangelismRecord,
};
pub use meeting::{Meeting, MeetingKind};
pub use membership::{Member, Unit, UnitKind};
pub use prayer::{EndPrayerSession, NewPrayerSession, PrayerSession};
pub use study::{AssignmentSubmission, Grade, GradeRequest, StudyAssignment};
