//! HTTP surface for the classroom directory.
//!
//! # Responsibility
//! - Route JSON requests to core services and map outcomes to statuses.
//! - Log one access line per request, tagged with a request id.
//!
//! # Invariants
//! - No process-global storage handle; state is passed explicitly.
//! - Error responses always carry `{ "message": ... }`.

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

pub mod api;
pub mod error;
pub mod validate;

pub use error::{ApiError, ErrorBody};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// SQLite file every request opens its connection against.
    pub db_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/register", post(api::register))
        .route("/api/commonstudents", get(api::common_students))
        .route("/api/suspend", post(api::suspend))
        .route(
            "/api/retrievefornotifications",
            post(api::retrieve_for_notifications),
        )
        .route("/api/health", get(api::health))
        .fallback(api::not_found)
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let status = response.status();
    let duration_ms = started_at.elapsed().as_millis();

    if status.is_server_error() {
        warn!(
            "event=http_request module=api status={} request_id={} method={} path={} duration_ms={}",
            status.as_u16(),
            request_id,
            method,
            path,
            duration_ms
        );
    } else {
        info!(
            "event=http_request module=api status={} request_id={} method={} path={} duration_ms={}",
            status.as_u16(),
            request_id,
            method,
            path,
            duration_ms
        );
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}
