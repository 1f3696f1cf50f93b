//! # API Error Responses
//!
//! Handlers never format error bodies themselves. Every failure is turned
//! into a [`RequestError`](gatehouse_core::RequestError), passed through
//! the shared [`ErrorNormalizer`](gatehouse_core::ErrorNormalizer) via
//! [`AppState::reject`](crate::state::AppState::reject), and returned as an
//! [`AppError`] carrying the normalized `{code, payload}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gatehouse_core::NormalizedError;

/// A normalized error ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct AppError(pub NormalizedError);

impl AppError {
    /// HTTP status for the normalized code. Codes outside the valid range
    /// are sent as 500.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<NormalizedError> for AppError {
    fn from(err: NormalizedError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.0.body())).into_response()
    }
}
