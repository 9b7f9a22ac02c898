//! HTTP error envelope.
//!
//! Every failure answers `{ "message": ... }`. Internal failures are logged
//! with full detail and answered generically.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use classroom_core::db::DbError;
use classroom_core::{ErrorKind, ServiceError};
use log::error;
use serde::Serialize;
use std::fmt::{Display, Formatter};

const INTERNAL_MESSAGE: &str = "internal server error";

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Transport-level error mapped onto an HTTP status.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    /// Detail is logged, never returned to the caller.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(message) | Self::NotFound(message) | Self::Internal(message) => {
                write!(f, "{message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value.kind() {
            ErrorKind::InvalidInput => Self::BadRequest(value.to_string()),
            ErrorKind::NotFound => Self::NotFound(value.to_string()),
            ErrorKind::Internal => Self::Internal(value.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::Internal(format!("database unavailable: {value}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest(message) | Self::NotFound(message) => message,
            Self::Internal(detail) => {
                error!(
                    "event=request_failed module=api status=error error_code=internal error={}",
                    detail
                );
                INTERNAL_MESSAGE.to_string()
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}
