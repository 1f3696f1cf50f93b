//! `Users` providers: account signup, login and partial update.
//!
//! Passwords are validated here and nowhere else; they are never stored
//! or echoed by the user store.

use gatehouse_schema::fragments::{email, iso_date, object_id};
use serde_json::{json, Value};

use crate::decorate::Decoration;
use crate::provider::Plugin;

/// A non-empty string.
fn text() -> Value {
    json!({
        "type": "string",
        "minLength": 1,
        "x-messages": { "minLength": "is not allowed to be empty" }
    })
}

fn bounded_text(max: u64) -> Value {
    json!({
        "type": "string",
        "minLength": 1,
        "maxLength": max,
        "x-messages": { "minLength": "is not allowed to be empty" }
    })
}

fn password(with_pattern: bool) -> Value {
    let mut schema = json!({ "type": "string", "minLength": 8, "maxLength": 30 });
    if with_pattern {
        schema["pattern"] = json!("[a-zA-Z0-9]{3,30}");
    }
    schema
}

fn profile() -> Value {
    json!({
        "type": "object",
        "properties": {
            "first_name": bounded_text(100),
            "last_name": bounded_text(100),
            "phone": {
                "type": "string",
                "minLength": 11,
                "maxLength": 12,
                "pattern": r"^(923)\d{9}$",
                "x-messages": { "pattern": "must be a mobile number in the form 923XXXXXXXXX" }
            },
            "cnic": { "type": "string", "minLength": 13, "maxLength": 13 },
            "address": text(),
            "date_of_birth": iso_date(),
            "gender": { "type": "string", "enum": ["M", "F", "Male", "Female"] },
            "picture": text()
        }
    })
}

fn account_decoration() -> Decoration {
    Decoration::default()
        .trim(["username", "email"])
        .lowercase(["email"])
}

/// `Users/signup`: a new account.
#[derive(Debug, Clone, Copy)]
pub struct Signup;

impl Plugin for Signup {
    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["username", "email", "password"],
            "properties": {
                "username": text(),
                "email": email(),
                "password": password(true),
                "access_token": text(),
                "dt": iso_date(),
                "created_by": object_id(),
                "deleted_by": object_id(),
                "updated_by": object_id(),
                "blocked_by": object_id(),
                "is_deleted": { "type": "boolean" },
                "is_blocked": { "type": "boolean" },
                "is_super_admin": { "type": "boolean" },
                "ip": text(),
                "x_access_token": text(),
                "last_login": iso_date(),
                "is_login": { "type": "boolean" },
                "city": object_id(),
                "status": text(),
                "dtu": iso_date(),
                "profile": profile()
            }
        })
    }

    fn decorate(&self, raw: &Value) -> Value {
        account_decoration().apply(raw)
    }
}

/// `Users/login`: credential check input.
#[derive(Debug, Clone, Copy)]
pub struct Login;

impl Plugin for Login {
    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["email", "password"],
            "properties": {
                "email": email(),
                "password": password(false),
                "remember_me": { "type": "boolean", "default": false },
                "ip": text(),
                "user_agent": text()
            }
        })
    }

    fn decorate(&self, raw: &Value) -> Value {
        Decoration::default()
            .trim(["email"])
            .lowercase(["email"])
            .default_value("remember_me", Value::Bool(false))
            .apply(raw)
    }
}

/// `Users/update`: partial update of an existing account.
#[derive(Debug, Clone, Copy)]
pub struct Update;

impl Plugin for Update {
    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "minProperties": 1,
            "properties": {
                "username": text(),
                "email": email(),
                "password": password(true),
                "updated_by": object_id(),
                "is_deleted": { "type": "boolean" },
                "is_blocked": { "type": "boolean" },
                "is_super_admin": { "type": "boolean" },
                "status": text(),
                "profile": profile()
            }
        })
    }

    fn decorate(&self, raw: &Value) -> Value {
        account_decoration().apply(raw)
    }
}
