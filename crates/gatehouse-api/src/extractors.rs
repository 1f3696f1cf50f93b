//! # Request Extractors
//!
//! Body extraction helpers that turn axum rejections into domain errors,
//! so malformed bodies get the same normalized response shape as every
//! other failure.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::Json;
use gatehouse_core::DomainError;

/// Extract a JSON body, mapping rejections to a 400 [`DomainError`].
///
/// ```ignore
/// async fn handler(body: Result<Json<Value>, JsonRejection>) -> Result<..., AppError> {
///     let raw = extract_json(body).map_err(|e| state.reject(e))?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, DomainError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| DomainError::bad_request(err.body_text()))
}

/// Extract a path parameter. A parameter that does not parse cannot name
/// an existing record, so it is reported as `not_found`.
pub fn extract_path<T>(
    result: Result<Path<T>, PathRejection>,
    not_found: &str,
) -> Result<T, DomainError> {
    result
        .map(|Path(v)| v)
        .map_err(|_| DomainError::not_found(not_found))
}
