//! # MDASH Common Library
//!
//! Shared code for the ministry dashboard crates including:
//! - API data models (attendance, meetings, membership, evangelism,
//!   follow-up, study groups, prayer groups)
//! - Identifier and timestamp helpers
//! - Configuration loading
//! - Credential storage for the bearer token

pub mod config;
pub mod credentials;
pub mod error;
pub mod ids;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use ids::{AttendeeId, SubmissionId};
