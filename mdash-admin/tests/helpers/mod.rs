//! In-process mock of the ministry backend
//!
//! Serves the endpoints the client uses from shared in-memory state and
//! records every authenticated request so tests can check order and headers.

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use mdash_common::models::{
    AssignmentSubmission, AttendanceSubmission, Attendee, EvangelismRecord, FollowUp,
    FollowUpStatus, FollowUpUpdate, Grade, LoginRequest, LoginResponse, Meeting, MeetingKind,
    Member, PrayerSession, SubmissionStatus, Unit, UnitKind, UserProfile,
};
use mdash_common::{AttendeeId, SubmissionId};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard};

pub const TOKEN: &str = "tok-valid";
pub const PASSWORD: &str = "secret";

#[derive(Default)]
pub struct Inner {
    pub submissions: Vec<AttendanceSubmission>,
    /// Served instead of `submissions` when set
    pub raw_submissions: Option<Value>,
    pub units: Vec<Unit>,
    pub members: Vec<Member>,
    pub follow_ups: Vec<FollowUp>,
    pub meetings: Vec<Meeting>,
    pub evangelism: Vec<EvangelismRecord>,
    pub assignment_submissions: Vec<AssignmentSubmission>,
    pub prayer_sessions: Vec<PrayerSession>,
    /// Writes answer 500
    pub fail_writes: bool,
    /// Submission PUTs to these ids answer 500
    pub failing_ids: Vec<String>,
    /// Every authenticated request answers 401
    pub expire_session: bool,
    /// "METHOD /path" of each authenticated request
    pub requests: Vec<String>,
    pub auth_headers: Vec<Option<String>>,
    /// Bodies of submission PUTs, in arrival order
    pub puts: Vec<AttendanceSubmission>,
    /// Raw JSON bodies of every other write, in arrival order
    pub bodies: Vec<Value>,
}

type Shared = Arc<Mutex<Inner>>;
type ApiError = (StatusCode, Json<Value>);

pub struct MockBackend {
    pub base_url: String,
    state: Shared,
}

impl MockBackend {
    pub async fn spawn(inner: Inner) -> Self {
        let state: Shared = Arc::new(Mutex::new(inner));
        let app = Router::new()
            .nest("/api", routes())
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    pub fn inner(&self) -> MutexGuard<'_, Inner> {
        self.state.lock().unwrap()
    }
}

fn routes() -> Router<Shared> {
    Router::new()
        .route("/auth/login", post(login))
        .route(
            "/attendance/submissions",
            get(list_submissions).post(file_submission),
        )
        .route("/attendance/submissions/:id", put(upsert_submission))
        .route("/attendance/submissions/:id/reject", post(reject_submission))
        .route("/units", get(list_units))
        .route("/members", get(list_members))
        .route("/follow-ups", get(list_follow_ups))
        .route("/follow-ups/:id", put(update_follow_up))
        .route("/meetings", get(list_meetings))
        .route("/evangelism", get(list_evangelism).post(create_evangelism))
        .route(
            "/study-groups/assignments/:id/submissions",
            get(list_assignment_submissions),
        )
        .route("/study-groups/submissions/:id/grade", put(grade_submission))
        .route(
            "/prayer-groups/sessions",
            get(list_prayer_sessions).post(start_prayer_session),
        )
        .route("/prayer-groups/sessions/:id/end", post(end_prayer_session))
}

fn error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "message": message })))
}

/// Record the request and check its bearer token
fn authorize<'a>(
    state: &'a Shared,
    headers: &HeaderMap,
    label: String,
) -> Result<MutexGuard<'a, Inner>, ApiError> {
    let mut inner = state.lock().unwrap();
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    inner.requests.push(label);
    inner.auth_headers.push(auth.clone());

    if inner.expire_session || auth.as_deref() != Some(format!("Bearer {}", TOKEN).as_str()) {
        return Err(error(StatusCode::UNAUTHORIZED, "token expired"));
    }
    Ok(inner)
}

async fn login(Json(body): Json<LoginRequest>) -> Result<Json<LoginResponse>, ApiError> {
    if body.password != PASSWORD {
        return Err(error(StatusCode::UNAUTHORIZED, "Invalid email or password"));
    }
    Ok(Json(LoginResponse {
        token: TOKEN.to_string(),
        user: UserProfile {
            id: "u-1".to_string(),
            name: "Pastor Ade".to_string(),
            role: Some("admin".to_string()),
        },
    }))
}

async fn list_submissions(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let inner = authorize(&state, &headers, "GET /attendance/submissions".to_string())?;
    let body = match &inner.raw_submissions {
        Some(raw) => raw.clone(),
        None => serde_json::to_value(&inner.submissions).unwrap(),
    };
    Ok(Json(body))
}

async fn upsert_submission(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<AttendanceSubmission>,
) -> Result<Json<AttendanceSubmission>, ApiError> {
    let mut inner = authorize(&state, &headers, format!("PUT /attendance/submissions/{}", id))?;
    if inner.fail_writes || inner.failing_ids.contains(&id) {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable"));
    }
    if body.id.as_str() != id {
        return Err(error(StatusCode::BAD_REQUEST, "id mismatch"));
    }

    inner.puts.push(body.clone());
    match inner.submissions.iter().position(|s| s.id == body.id) {
        Some(index) => inner.submissions[index] = body.clone(),
        None => inner.submissions.push(body.clone()),
    }
    Ok(Json(body))
}

/// Assigns the next `s-N` id and stores the report as pending
async fn file_submission(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<AttendanceSubmission>, ApiError> {
    let mut inner = authorize(&state, &headers, "POST /attendance/submissions".to_string())?;
    if inner.fail_writes {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable"));
    }
    inner.bodies.push(body.clone());

    let mut record = body;
    record["id"] = json!(format!("s-{}", inner.submissions.len() + 1));
    record["status"] = json!("Pending");
    record["createdAt"] = json!("2024-03-17T12:00:00Z");
    let submission: AttendanceSubmission = serde_json::from_value(record)
        .map_err(|e| error(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()))?;
    inner.submissions.push(submission.clone());
    Ok(Json(submission))
}

async fn reject_submission(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let mut inner = authorize(
        &state,
        &headers,
        format!("POST /attendance/submissions/{}/reject", id),
    )?;
    if inner.fail_writes {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable"));
    }
    let id = SubmissionId::new(id);
    match inner.submissions.iter_mut().find(|s| s.id == id) {
        Some(s) => {
            s.status = SubmissionStatus::Rejected;
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(error(StatusCode::NOT_FOUND, "no such submission")),
    }
}

async fn list_units(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<Unit>>, ApiError> {
    let inner = authorize(&state, &headers, "GET /units".to_string())?;
    Ok(Json(inner.units.clone()))
}

async fn list_members(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<Member>>, ApiError> {
    let inner = authorize(&state, &headers, "GET /members".to_string())?;
    Ok(Json(inner.members.clone()))
}

async fn list_follow_ups(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<FollowUp>>, ApiError> {
    let inner = authorize(&state, &headers, "GET /follow-ups".to_string())?;
    Ok(Json(inner.follow_ups.clone()))
}

async fn update_follow_up(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(update): Json<FollowUpUpdate>,
) -> Result<Json<FollowUp>, ApiError> {
    let mut inner = authorize(&state, &headers, format!("PUT /follow-ups/{}", id))?;
    let follow_up = inner
        .follow_ups
        .iter_mut()
        .find(|f| f.id == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "no such follow-up"))?;
    if let Some(status) = update.status {
        follow_up.status = status;
    }
    if let Some(assigned_to) = update.assigned_to {
        follow_up.assigned_to = assigned_to;
    }
    if update.notes.is_some() {
        follow_up.notes = update.notes;
    }
    Ok(Json(follow_up.clone()))
}

async fn list_meetings(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<Meeting>>, ApiError> {
    let inner = authorize(&state, &headers, "GET /meetings".to_string())?;
    Ok(Json(inner.meetings.clone()))
}

async fn list_evangelism(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<EvangelismRecord>>, ApiError> {
    let inner = authorize(&state, &headers, "GET /evangelism".to_string())?;
    Ok(Json(inner.evangelism.clone()))
}

async fn create_evangelism(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<EvangelismRecord>, ApiError> {
    let mut inner = authorize(&state, &headers, "POST /evangelism".to_string())?;
    inner.bodies.push(body.clone());

    let mut record = body;
    record["id"] = json!(format!("ev-{}", inner.evangelism.len() + 1));
    record["createdAt"] = json!("2024-03-17T12:00:00Z");
    let record: EvangelismRecord = serde_json::from_value(record)
        .map_err(|e| error(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()))?;
    inner.evangelism.push(record.clone());
    Ok(Json(record))
}

async fn list_assignment_submissions(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<AssignmentSubmission>>, ApiError> {
    let inner = authorize(
        &state,
        &headers,
        format!("GET /study-groups/assignments/{}/submissions", id),
    )?;
    let matching = inner
        .assignment_submissions
        .iter()
        .filter(|s| s.assignment_id == id)
        .cloned()
        .collect();
    Ok(Json(matching))
}

async fn grade_submission(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<AssignmentSubmission>, ApiError> {
    let mut inner = authorize(
        &state,
        &headers,
        format!("PUT /study-groups/submissions/{}/grade", id),
    )?;
    inner.bodies.push(body.clone());

    let grade = Grade {
        score: body["score"].as_f64().unwrap_or_default(),
        feedback: body["feedback"].as_str().map(str::to_string),
        graded_by: body["gradedBy"].as_str().unwrap_or_default().to_string(),
        graded_at: Utc.with_ymd_and_hms(2024, 3, 17, 12, 0, 0).unwrap(),
    };
    let submission = inner
        .assignment_submissions
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "no such assignment submission"))?;
    submission.grade = Some(grade);
    Ok(Json(submission.clone()))
}

async fn list_prayer_sessions(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<PrayerSession>>, ApiError> {
    let inner = authorize(&state, &headers, "GET /prayer-groups/sessions".to_string())?;
    Ok(Json(inner.prayer_sessions.clone()))
}

async fn start_prayer_session(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<PrayerSession>, ApiError> {
    let mut inner = authorize(&state, &headers, "POST /prayer-groups/sessions".to_string())?;
    inner.bodies.push(body.clone());

    let mut session = body;
    session["id"] = json!(format!("p-{}", inner.prayer_sessions.len() + 1));
    let session: PrayerSession = serde_json::from_value(session)
        .map_err(|e| error(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()))?;
    inner.prayer_sessions.push(session.clone());
    Ok(Json(session))
}

async fn end_prayer_session(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<PrayerSession>, ApiError> {
    let mut inner = authorize(
        &state,
        &headers,
        format!("POST /prayer-groups/sessions/{}/end", id),
    )?;
    inner.bodies.push(body.clone());

    let ended_at: DateTime<Utc> = serde_json::from_value(body["endedAt"].clone())
        .map_err(|e| error(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()))?;
    let attendees: Vec<Attendee> = serde_json::from_value(body["attendees"].clone())
        .unwrap_or_default();
    let session = inner
        .prayer_sessions
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "no such prayer session"))?;
    session.ended_at = Some(ended_at);
    session.attendees = attendees;
    Ok(Json(session.clone()))
}

// ----------------------------------------------------------------------
// Fixtures
// ----------------------------------------------------------------------

/// Pending submission with two participants and one first-timer
pub fn sample_submission(id: &str) -> AttendanceSubmission {
    AttendanceSubmission {
        id: SubmissionId::new(id),
        meeting_id: "m-1".to_string(),
        meeting_title: "Sunday Service".to_string(),
        submitted_by: "Ada O., Tunde B.".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        participants: vec![
            Attendee::new("mem-1", "Joy E."),
            Attendee::new("mem-2", "Kelechi U."),
        ],
        first_timers: vec![Attendee::named("Razak Okoya")],
        status: SubmissionStatus::Pending,
        created_at: Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap(),
    }
}

pub fn sample_units() -> Vec<Unit> {
    vec![
        Unit {
            id: "u-grace".to_string(),
            name: "Grace Fellowship".to_string(),
            kind: UnitKind::Fellowship,
        },
        Unit {
            id: "u-zion".to_string(),
            name: "Zion Cell".to_string(),
            kind: UnitKind::Cell,
        },
    ]
}

pub fn sample_members() -> Vec<Member> {
    vec![
        Member {
            id: AttendeeId::new("mem-1"),
            name: "Joy E.".to_string(),
            unit_id: Some("u-grace".to_string()),
            phone: None,
        },
        Member {
            id: AttendeeId::new("mem-2"),
            name: "Kelechi U.".to_string(),
            unit_id: Some("u-zion".to_string()),
            phone: None,
        },
    ]
}

pub fn sample_follow_up(id: &str, status: FollowUpStatus) -> FollowUp {
    FollowUp {
        id: id.to_string(),
        evangelism_id: Some("ev-1".to_string()),
        contact_name: "Chinedu A.".to_string(),
        assigned_to: "Ada O.".to_string(),
        status,
        notes: None,
        updated_at: Utc.with_ymd_and_hms(2024, 3, 12, 9, 0, 0).unwrap(),
    }
}

pub fn sample_meetings() -> Vec<Meeting> {
    vec![Meeting {
        id: "m-1".to_string(),
        title: "Sunday Service".to_string(),
        kind: MeetingKind::Service,
        date: NaiveDate::from_ymd_opt(2024, 3, 17).unwrap(),
        location: Some("Main auditorium".to_string()),
    }]
}

pub fn sample_assignment_submission(id: &str) -> AssignmentSubmission {
    AssignmentSubmission {
        id: id.to_string(),
        assignment_id: "a-1".to_string(),
        member: Attendee::new("mem-1", "Joy E."),
        submitted_at: Utc.with_ymd_and_hms(2024, 3, 14, 18, 0, 0).unwrap(),
        grade: None,
    }
}

pub fn sample_prayer_session(id: &str) -> PrayerSession {
    PrayerSession {
        id: id.to_string(),
        group_id: "g-1".to_string(),
        leader: "Sister Bola".to_string(),
        started_at: Utc.with_ymd_and_hms(2024, 3, 15, 5, 0, 0).unwrap(),
        ended_at: None,
        attendees: vec![],
        topics: vec!["Missions".to_string()],
    }
}

/// Times `attendee` is listed across all `submissions`
pub fn occurrences(submissions: &[AttendanceSubmission], attendee: &AttendeeId) -> usize {
    submissions
        .iter()
        .flat_map(|s| s.attendees())
        .filter(|a| &a.id == attendee)
        .count()
}
