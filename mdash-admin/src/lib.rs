//! mdash-admin - Ministry dashboard administration
//!
//! Library half of the `mdash-admin` tool:
//! - `client`: typed REST client with bearer auth and session-expiry handling
//! - `controller`: runs the attendance review state against the backend
//! - `render`: plain-text tables for the command line

pub mod client;
pub mod controller;
pub mod error;
pub mod render;

pub use client::ApiClient;
pub use controller::ReviewController;
pub use error::{ClientError, ControllerError};
