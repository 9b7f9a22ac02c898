//! Route handlers for the directory's four use cases.
//!
//! # Responsibility
//! - Parse and validate request shapes, then hand plain values to core.
//! - Run blocking storage work off the async runtime.
//!
//! # Invariants
//! - Validation fails before any connection is opened.
//! - Each request opens its own connection from `AppState`.

use crate::error::ApiError;
use crate::validate::{json_body, required_email, required_email_list, required_text};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use classroom_core::db::open_db;
use classroom_core::{
    core_version, CommonStudentService, DirectoryService, NotificationService,
    RegistrationService, ServiceResult, SqliteUserRepository,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// `POST /api/register` body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub teacher: Option<String>,
    pub students: Option<Vec<String>>,
}

/// `POST /api/suspend` body.
#[derive(Debug, Deserialize)]
pub struct SuspendRequest {
    pub student: Option<String>,
}

/// `POST /api/retrievefornotifications` body.
#[derive(Debug, Deserialize)]
pub struct NotificationRequest {
    pub teacher: Option<String>,
    pub notification: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommonStudentsResponse {
    pub students: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipientsResponse {
    pub recipients: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = json_body(payload)?;
    let teacher = required_email("teacher", request.teacher)?;
    let students = required_email_list("students", request.students)?;

    with_connection(&state, move |conn| {
        RegistrationService::new(SqliteUserRepository::new(conn))
            .register_students(&teacher, &students)
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Accepts `?teacher=a` or repeated `?teacher=a&teacher=b`.
pub async fn common_students(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<CommonStudentsResponse>, ApiError> {
    let raw = params
        .into_iter()
        .filter(|(key, _)| key == "teacher")
        .map(|(_, value)| value)
        .collect::<Vec<_>>();
    let teachers = required_email_list("teacher", Some(raw))?;

    let students = with_connection(&state, move |conn| {
        CommonStudentService::new(SqliteUserRepository::new(conn)).list_common_students(&teachers)
    })
    .await?;

    Ok(Json(CommonStudentsResponse { students }))
}

pub async fn suspend(
    State(state): State<AppState>,
    payload: Result<Json<SuspendRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = json_body(payload)?;
    let student = required_email("student", request.student)?;

    with_connection(&state, move |conn| {
        DirectoryService::new(SqliteUserRepository::new(conn)).suspend_student(&student)
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn retrieve_for_notifications(
    State(state): State<AppState>,
    payload: Result<Json<NotificationRequest>, JsonRejection>,
) -> Result<Json<RecipientsResponse>, ApiError> {
    let request = json_body(payload)?;
    let teacher = required_email("teacher", request.teacher)?;
    let notification = required_text("notification", request.notification)?;

    let recipients = with_connection(&state, move |conn| {
        NotificationService::new(SqliteUserRepository::new(conn))
            .resolve_recipients(&teacher, &notification)
    })
    .await?;

    Ok(Json(RecipientsResponse { recipients }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: core_version().to_string(),
    })
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("route not found".to_string())
}

async fn with_connection<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut Connection) -> ServiceResult<T> + Send + 'static,
{
    let db_path = state.db_path.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = open_db(db_path.as_path())?;
        f(&mut conn).map_err(ApiError::from)
    })
    .await
    .map_err(|err| ApiError::Internal(format!("storage task failed: {err}")))?
}
