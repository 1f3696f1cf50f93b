//! # Users Resource
//!
//! ## Endpoints
//!
//! - `GET /v1/users`: list users
//! - `GET /v1/users/{id}`: get user
//! - `POST /v1/users`: sign up (validated by `Users/signup`)
//! - `PUT /v1/users/{id}`: partial update (validated by `Users/update`)
//! - `DELETE /v1/users/{id}`: delete user
//!
//! Request bodies go through the validation pipeline before they reach
//! the store. Only validated, stripped data is stored.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use gatehouse_core::DomainError;
use gatehouse_plugins::ValidateOptions;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_json, extract_path};
use crate::state::{AppState, UserRecord};

/// Resource key the user routes validate against.
const RESOURCE: &str = "Users";

const NOT_FOUND: &str = "User not found";

// ── Response DTOs ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<UserRecord>,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: UserRecord,
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/users", get(list_users).post(create_user))
        .route(
            "/v1/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/users
async fn list_users(State(state): State<AppState>) -> Json<UserList> {
    Json(UserList {
        users: state.users.list(),
    })
}

/// GET /v1/users/{id}
async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<UserEnvelope>, AppError> {
    let id = extract_path(id, NOT_FOUND).map_err(|e| state.reject(e))?;
    state
        .users
        .get(&id)
        .map(|user| Json(UserEnvelope { user }))
        .ok_or_else(|| state.reject(DomainError::not_found(NOT_FOUND)))
}

/// POST /v1/users
async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    let data = validated(&state, "signup", body)?;
    let user = state.users.create(data).map_err(|e| state.reject(e))?;
    tracing::info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(UserEnvelope { user })))
}

/// PUT /v1/users/{id}
async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UserEnvelope>, AppError> {
    let id = extract_path(id, NOT_FOUND).map_err(|e| state.reject(e))?;
    let changes = validated(&state, "update", body)?;
    let user = state
        .users
        .update(&id, changes)
        .map_err(|e| state.reject(e))?;
    Ok(Json(UserEnvelope { user }))
}

/// DELETE /v1/users/{id}
async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = extract_path(id, NOT_FOUND).map_err(|e| state.reject(e))?;
    state.users.delete(&id).map_err(|e| state.reject(e))?;
    tracing::info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Run a body through the `Users/<subtype>` provider.
fn validated(
    state: &AppState,
    subtype: &str,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Map<String, Value>, AppError> {
    let raw = extract_json(body).map_err(|e| state.reject(e))?;
    let outcome = state
        .pipeline
        .validate(RESOURCE, &raw, &ValidateOptions::subtype(subtype))
        .map_err(|e| state.reject(e))?;

    match outcome.into_result() {
        Ok(Value::Object(data)) => Ok(data),
        Ok(_) => Err(state.reject(DomainError::bad_request("body must be a JSON object"))),
        Err(violations) => Err(state.reject(violations)),
    }
}
