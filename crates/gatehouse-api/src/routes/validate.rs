//! # Validation Dry Run
//!
//! `POST /v1/validate/{resource}?type=<subtype>` runs a payload through the
//! validation pipeline and returns the Validation Outcome as-is. Nothing is
//! stored. A schema failure is a normal outcome (`isValid: false`); only an
//! unresolvable resource is an error.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::routing::post;
use axum::{Json, Router};
use gatehouse_plugins::{ValidateOptions, ValidationOutcome};
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ValidateQuery {
    /// Operation subtype.
    #[serde(rename = "type")]
    pub subtype: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/validate/{resource}", post(validate_payload))
}

/// POST /v1/validate/{resource}
async fn validate_payload(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(query): Query<ValidateQuery>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ValidationOutcome>, AppError> {
    let raw = extract_json(body).map_err(|e| state.reject(e))?;
    let options = ValidateOptions {
        subtype: query.subtype,
    };
    state
        .pipeline
        .validate(&resource, &raw, &options)
        .map(Json)
        .map_err(|e| state.reject(e))
}
