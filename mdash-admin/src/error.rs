//! Error types for mdash-admin

use mdash_attendance::ReviewError;
use thiserror::Error;

/// Errors from talking to the backend
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered 401; stored credentials have been cleared
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// No token stored
    #[error("Not logged in, run `mdash-admin login` first")]
    NotAuthenticated,

    #[error("Login failed: {0}")]
    LoginRejected(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    /// Credential store or other shared failure
    #[error(transparent)]
    Common(#[from] mdash_common::Error),
}

impl ClientError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }
}

/// Errors from driving the review screen
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The action was refused before anything was sent
    #[error(transparent)]
    Review(#[from] ReviewError),

    /// The action was applied locally but saving it failed
    #[error("Saving failed: {0}")]
    Persist(#[source] ClientError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ControllerError {
    pub fn is_session_expired(&self) -> bool {
        match self {
            ControllerError::Persist(e) | ControllerError::Client(e) => e.is_session_expired(),
            ControllerError::Review(_) => false,
        }
    }
}
