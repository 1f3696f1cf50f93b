//! # Application State
//!
//! Shared state injected into every handler: configuration, the validation
//! pipeline, the error normalizer and the in-memory user store. Everything
//! except the user store is built once at bootstrap and read-only after.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gatehouse_core::{DomainError, ErrorNormalizer, RequestError};
use gatehouse_plugins::{builtin, PipelineConfig, PluginRegistry, ValidationPipeline};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::AppError;

/// Attributes the store never keeps.
const UNSTORED: &[&str] = &["password"];

/// A stored user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Remaining validated attributes (`status`, `profile`, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// In-memory user store, in insertion order.
///
/// Input is expected to be validated already. Uniqueness of `email` and
/// `username` is checked under the write lock.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    data: Arc<RwLock<IndexMap<Uuid, UserRecord>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All users, oldest first.
    pub fn list(&self) -> Vec<UserRecord> {
        self.data.read().values().cloned().collect()
    }

    pub fn get(&self, id: &Uuid) -> Option<UserRecord> {
        self.data.read().get(id).cloned()
    }

    /// Create a user from validated signup data.
    pub fn create(&self, mut data: Map<String, Value>) -> Result<UserRecord, DomainError> {
        let username = take_string(&mut data, "username")
            .ok_or_else(|| DomainError::bad_request("username is required"))?;
        let email = take_string(&mut data, "email")
            .ok_or_else(|| DomainError::bad_request("email is required"))?;
        for key in UNSTORED {
            data.remove(*key);
        }

        let mut guard = self.data.write();
        ensure_unique(guard.values(), None, Some(&username), Some(&email))?;

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            username,
            email,
            attributes: data,
            created_at: now,
            updated_at: now,
        };
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    /// Apply validated partial-update data. `profile` is merged key by key.
    pub fn update(
        &self,
        id: &Uuid,
        mut changes: Map<String, Value>,
    ) -> Result<UserRecord, DomainError> {
        for key in UNSTORED {
            changes.remove(*key);
        }
        let username = take_string(&mut changes, "username");
        let email = take_string(&mut changes, "email");

        let mut guard = self.data.write();
        if !guard.contains_key(id) {
            return Err(user_not_found());
        }
        ensure_unique(guard.values(), Some(id), username.as_deref(), email.as_deref())?;

        let record = guard.get_mut(id).ok_or_else(user_not_found)?;
        if let Some(username) = username {
            record.username = username;
        }
        if let Some(email) = email {
            record.email = email;
        }
        for (key, value) in changes {
            let replace = match (record.attributes.get_mut(&key), value) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    existing.extend(incoming);
                    None
                }
                (_, value) => Some(value),
            };
            if let Some(value) = replace {
                record.attributes.insert(key, value);
            }
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    pub fn delete(&self, id: &Uuid) -> Result<UserRecord, DomainError> {
        self.data.write().shift_remove(id).ok_or_else(user_not_found)
    }
}

fn user_not_found() -> DomainError {
    DomainError::not_found("User not found")
}

fn take_string(data: &mut Map<String, Value>, key: &str) -> Option<String> {
    match data.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            data.insert(key.to_string(), other);
            None
        }
        None => None,
    }
}

fn ensure_unique<'a>(
    users: impl Iterator<Item = &'a UserRecord>,
    except: Option<&Uuid>,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<(), DomainError> {
    for user in users.filter(|u| Some(&u.id) != except) {
        if email.is_some_and(|e| e == user.email) {
            return Err(DomainError::conflict("Email already registered"));
        }
        if username.is_some_and(|n| n == user.username) {
            return Err(DomainError::conflict("Username already taken"));
        }
    }
    Ok(())
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<ValidationPipeline>,
    pub normalizer: Arc<ErrorNormalizer>,
    pub users: UserStore,
}

impl AppState {
    /// State with default configuration and the built-in plugins only.
    pub fn new() -> Self {
        let registry = PluginRegistry::load(&builtin::layout());
        Self::with_registry(AppConfig::default(), registry)
    }

    /// State over an already loaded registry.
    pub fn with_registry(config: AppConfig, registry: PluginRegistry) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(ValidationPipeline::new(
                Arc::new(registry),
                PipelineConfig::default(),
            )),
            normalizer: Arc::new(ErrorNormalizer::default()),
            users: UserStore::new(),
        }
    }

    /// Normalize an error into a response.
    pub fn reject(&self, err: impl Into<RequestError>) -> AppError {
        AppError::from(self.normalizer.normalize(&err.into()))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
