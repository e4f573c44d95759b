//! REST client for the ministry backend
//!
//! Every authenticated call goes through [`ApiClient::dispatch`], which
//! attaches the stored bearer token and handles a 401 the same way for all
//! endpoints: the stored credentials are cleared and
//! [`ClientError::SessionExpired`] is returned. There is no retry.

use crate::error::ClientError;
use mdash_common::config::{ClientSettings, DEFAULT_REQUEST_TIMEOUT_SECS};
use mdash_common::credentials::{CredentialStore, Credentials};
use mdash_common::models::{
    ApiErrorBody, AssignmentSubmission, AttendanceSubmission, EndPrayerSession, EvangelismRecord,
    FollowUp, FollowUpUpdate, GradeRequest, LoginRequest, LoginResponse, Meeting, Member,
    NewEvangelismRecord, NewPrayerSession, NewSubmission, PrayerSession, Unit,
};
use mdash_common::SubmissionId;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("mdash-admin/", env!("CARGO_PKG_VERSION"));

/// Backend API client
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    pub fn new(
        settings: &ClientSettings,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ClientError> {
        Self::build(&settings.api_base_url, settings.request_timeout, credentials)
    }

    /// Client with the default timeout
    pub fn with_base_url(
        base_url: &str,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ClientError> {
        Self::build(
            base_url,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            credentials,
        )
    }

    fn build(
        base_url: &str,
        timeout: Duration,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Exchange email and password for a token and store it
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let url = self.url("/auth/login");
        debug!(url = %url, "Logging in");

        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = error_message(response)
                .await
                .unwrap_or_else(|| "invalid email or password".to_string());
            return Err(ClientError::LoginRejected(message));
        }
        let login: LoginResponse = decode(ensure_success(response).await?).await?;

        self.credentials
            .save(&Credentials::new(&login.token, Some(login.user.clone())))?;
        info!(user = %login.user.name, "Logged in");
        Ok(login)
    }

    /// Forget the stored session
    pub fn logout(&self) -> Result<(), ClientError> {
        self.credentials.clear()?;
        info!("Logged out");
        Ok(())
    }

    fn bearer_token(&self) -> Result<String, ClientError> {
        self.credentials
            .load()?
            .map(|c| c.token)
            .ok_or(ClientError::NotAuthenticated)
    }

    /// Send an authenticated request, applying the 401 interceptor
    async fn dispatch(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let token = self.bearer_token()?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(url = %response.url(), "Backend rejected token, clearing session");
            self.credentials.clear()?;
            return Err(ClientError::SessionExpired);
        }

        ensure_success(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        decode(self.dispatch(self.http.get(&url)).await?).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(url = %url, method = %method, "Sending");
        decode(self.dispatch(self.http.request(method, &url).json(body)).await?).await
    }

    // ------------------------------------------------------------------
    // Attendance
    // ------------------------------------------------------------------

    pub async fn get_submissions(&self) -> Result<Vec<AttendanceSubmission>, ClientError> {
        self.get_json("/attendance/submissions").await
    }

    /// File a new attendance report
    pub async fn file_submission(
        &self,
        submission: &NewSubmission,
    ) -> Result<AttendanceSubmission, ClientError> {
        self.send_json(Method::POST, "/attendance/submissions", submission)
            .await
    }

    /// Save a submission under its id, creating it if the backend does not
    /// know the id yet
    pub async fn create_or_update_submission(
        &self,
        submission: &AttendanceSubmission,
    ) -> Result<AttendanceSubmission, ClientError> {
        let path = format!("/attendance/submissions/{}", submission.id);
        self.send_json(Method::PUT, &path, submission).await
    }

    pub async fn reject_submission(&self, id: &SubmissionId) -> Result<(), ClientError> {
        let url = self.url(&format!("/attendance/submissions/{}/reject", id));
        debug!(url = %url, "Rejecting submission");
        self.dispatch(self.http.post(&url)).await?;
        Ok(())
    }

    pub async fn get_meetings(&self) -> Result<Vec<Meeting>, ClientError> {
        self.get_json("/meetings").await
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    pub async fn get_units(&self) -> Result<Vec<Unit>, ClientError> {
        self.get_json("/units").await
    }

    pub async fn get_members(&self) -> Result<Vec<Member>, ClientError> {
        self.get_json("/members").await
    }

    // ------------------------------------------------------------------
    // Evangelism and follow-up
    // ------------------------------------------------------------------

    pub async fn get_evangelism(&self) -> Result<Vec<EvangelismRecord>, ClientError> {
        self.get_json("/evangelism").await
    }

    pub async fn create_evangelism(
        &self,
        record: &NewEvangelismRecord,
    ) -> Result<EvangelismRecord, ClientError> {
        self.send_json(Method::POST, "/evangelism", record).await
    }

    pub async fn get_follow_ups(&self) -> Result<Vec<FollowUp>, ClientError> {
        self.get_json("/follow-ups").await
    }

    pub async fn update_follow_up(
        &self,
        id: &str,
        update: &FollowUpUpdate,
    ) -> Result<FollowUp, ClientError> {
        self.send_json(Method::PUT, &format!("/follow-ups/{}", id), update)
            .await
    }

    // ------------------------------------------------------------------
    // Study groups
    // ------------------------------------------------------------------

    pub async fn get_assignment_submissions(
        &self,
        assignment_id: &str,
    ) -> Result<Vec<AssignmentSubmission>, ClientError> {
        self.get_json(&format!(
            "/study-groups/assignments/{}/submissions",
            assignment_id
        ))
        .await
    }

    pub async fn grade_submission(
        &self,
        submission_id: &str,
        grade: &GradeRequest,
    ) -> Result<AssignmentSubmission, ClientError> {
        let path = format!("/study-groups/submissions/{}/grade", submission_id);
        self.send_json(Method::PUT, &path, grade).await
    }

    // ------------------------------------------------------------------
    // Prayer groups
    // ------------------------------------------------------------------

    pub async fn get_prayer_sessions(&self) -> Result<Vec<PrayerSession>, ClientError> {
        self.get_json("/prayer-groups/sessions").await
    }

    pub async fn start_prayer_session(
        &self,
        session: &NewPrayerSession,
    ) -> Result<PrayerSession, ClientError> {
        self.send_json(Method::POST, "/prayer-groups/sessions", session)
            .await
    }

    pub async fn end_prayer_session(
        &self,
        id: &str,
        end: &EndPrayerSession,
    ) -> Result<PrayerSession, ClientError> {
        let path = format!("/prayer-groups/sessions/{}/end", id);
        self.send_json(Method::POST, &path, end).await
    }
}

/// Turn a non-2xx response into `ClientError::Api`
async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = error_message(response)
        .await
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Best-effort message from an error body (JSON `message`, or plain text)
async fn error_message(response: Response) -> Option<String> {
    let text = response.text().await.ok()?;
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<ApiErrorBody>(text) {
        Ok(body) => body.message,
        Err(_) => Some(text.to_string()),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}
