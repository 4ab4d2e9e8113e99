//! Public API types

use axum::response::{IntoResponse, Json, Response};
use http::StatusCode;
use serde_json::json;

use crate::core::CalError;

// Errors

/// A status-coded API error answered as `{"detail": …}` JSON.
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, format!("Something went wrong: {}", err))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!("{} {}", self.status, self.detail);

        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Carry the request-level taxonomy's status codes onto the wire.
impl From<CalError> for ApiError {
    fn from(err: CalError) -> Self {
        let status = StatusCode::from_u16(err.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.to_string())
    }
}

// Re-export public types from each route

pub mod cal {
    pub use crate::api::routes::cal::public::*;
}

pub mod iframe {
    pub use crate::api::routes::iframe::public::*;
}
