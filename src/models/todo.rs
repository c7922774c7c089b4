use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents a todo entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier for the todo (UUID v4).
    pub id: Uuid,
    /// The title of the todo.
    #[serde(rename = "titulo")]
    pub title: String,
    /// An optional description.
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub completed: bool,
    /// Identifier of the user who owns the todo. Set from the bearer token, never from the body.
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body of `POST /todo`.
///
/// Unknown fields (including any attempt to set `user`) are ignored.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TodoInput {
    #[serde(rename = "titulo")]
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
}

/// Request body of `PUT /todo/{id}`. Absent fields keep their stored values.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TodoUpdate {
    #[serde(rename = "titulo")]
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub completed: Option<bool>,
}

impl Todo {
    /// Creates a new `Todo` owned by `user_id` from validated input.
    /// Title and description are trimmed; a blank description is dropped.
    pub fn new(input: TodoInput, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            description: trim_optional(input.description),
            start_date: input.start_date,
            end_date: input.end_date,
            completed: input.completed,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the fields present in `update` and bumps `updated_at`.
    pub fn apply(&mut self, update: TodoUpdate) {
        if let Some(title) = update.title {
            self.title = title.trim().to_string();
        }
        if update.description.is_some() {
            self.description = trim_optional(update.description);
        }
        if let Some(start_date) = update.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            self.end_date = end_date;
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        self.updated_at = Utc::now();
    }
}

impl TodoUpdate {
    /// The update with string fields trimmed, as it will be stored.
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description.map(|d| d.trim().to_string()),
            ..self
        }
    }
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("titulo is required".into());
        return Err(err);
    }
    Ok(())
}
