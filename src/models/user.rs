use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::auth::password::is_password_hash;

/// A registered account as stored and returned by the API.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body of `POST /user`.
///
/// `password` has already been replaced by its hash when this is deserialized;
/// the route is wrapped by `HashPassword`.
#[derive(Debug, Deserialize, Validate)]
pub struct UserInput {
    #[validate(custom(function = "validate_username"), length(max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_password_hash"))]
    pub password: String,
}

/// Request body of `PUT /user/{id}`. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(custom(function = "validate_username"), length(max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom(function = "validate_password_hash"))]
    pub password: Option<String>,
}

/// A user ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Changes applied by `UserStore::update_user`.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl From<UserInput> for NewUser {
    fn from(input: UserInput) -> Self {
        Self {
            username: input.username.trim().to_string(),
            email: input.email.trim().to_string(),
            password_hash: input.password,
        }
    }
}

impl From<UserUpdate> for UserChanges {
    fn from(update: UserUpdate) -> Self {
        Self {
            username: update.username.map(|u| u.trim().to_string()),
            email: update.email.map(|e| e.trim().to_string()),
            password_hash: update.password,
        }
    }
}

impl User {
    pub fn new(new_user: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Usernames are stored trimmed, so whitespace alone counts as empty.
fn validate_username(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("username is required".into());
        return Err(err);
    }
    Ok(())
}

/// Rejects passwords that did not go through `HashPassword` (e.g. an empty string).
fn validate_password_hash(value: &str) -> Result<(), ValidationError> {
    if is_password_hash(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("password");
        err.message = Some("password must be a non-empty string".into());
        Err(err)
    }
}
