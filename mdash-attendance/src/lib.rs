//! # MDASH Attendance
//!
//! Review workflow for batch attendance submissions:
//! - `partition`: approve a subset of a submission's attendees, leaving the
//!   rest pending, or reject the whole batch
//! - `selection`: the reviewer's current choice of attendees
//! - `grouping`: per-unit breakdown of workers, participants and first-timers
//! - `review_state`: reducer-style view state driving the review screen
//! - `summary`: per-meeting attendance totals
//!
//! Everything here is synchronous and free of I/O. Persisting the results
//! is the caller's job.

pub mod error;
pub mod grouping;
pub mod partition;
pub mod review_state;
pub mod selection;
pub mod summary;

pub use error::ReviewError;
pub use grouping::{
    group_by_unit, group_names, DirectoryUnitAssigner, HashedUnitAssigner, UnitAssigner,
    UnitBreakdown, UnitTally, UNASSIGNED_UNIT,
};
pub use partition::{reject_batch, review_selection, Fresh, ReviewOutcome};
pub use review_state::{Effect, ReviewAction, ReviewState};
pub use selection::{toggle_select_all, Selection};
pub use summary::{summarize, MeetingSummary};
