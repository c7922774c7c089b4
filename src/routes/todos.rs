use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Todo, TodoInput, TodoUpdate},
    store::TodoStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::{debug, info};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Retrieves every todo owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: a JSON array of `Todo` objects, oldest first.
/// - `401 Unauthorized`: missing or invalid bearer token.
#[get("")]
pub async fn list_todos(
    todos: web::Data<dyn TodoStore>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let todos = todos.list_todos(user.id).await?;
    debug!("listing {} todos for user {}", todos.len(), user.id);
    Ok(HttpResponse::Ok().json(todos))
}

/// Creates a new todo for the authenticated user.
///
/// The owner is always the authenticated user; a `user` field in the body is ignored.
///
/// ## Request Body:
/// - `titulo`: the title (required, non-blank).
/// - `description` (optional).
/// - `startDate`, `endDate`: RFC 3339 timestamps (required).
/// - `completed` (optional, defaults to `false`).
///
/// ## Responses:
/// - `201 Created`: the new `Todo`.
/// - `400 Bad Request`: malformed body or missing required field.
/// - `401 Unauthorized`: missing or invalid bearer token.
/// - `422 Unprocessable Entity`: a field failed validation.
#[post("")]
pub async fn create_todo(
    todos: web::Data<dyn TodoStore>,
    user: AuthenticatedUser,
    todo_data: web::Json<TodoInput>,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;

    let todo = todos
        .create_todo(Todo::new(todo_data.into_inner(), user.id))
        .await?;
    info!("user {} created todo {}", user.id, todo.id);

    Ok(HttpResponse::Created().json(todo))
}

/// Retrieves a todo by id. Todos owned by other users are reported as `404`.
#[get("/{id}")]
pub async fn get_todo(
    todos: web::Data<dyn TodoStore>,
    user: AuthenticatedUser,
    todo_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let todo = todos
        .find_todo(todo_id.into_inner(), user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;
    Ok(HttpResponse::Ok().json(todo))
}

/// Updates any subset of a todo's fields. Only the owner can update it.
///
/// ## Responses:
/// - `200 OK`: the updated `Todo`.
/// - `404 Not Found`: no such todo, or not owned by the caller.
#[put("/{id}")]
pub async fn update_todo(
    todos: web::Data<dyn TodoStore>,
    user: AuthenticatedUser,
    todo_id: web::Path<Uuid>,
    todo_data: web::Json<TodoUpdate>,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;

    let todo = todos
        .update_todo(todo_id.into_inner(), user.id, todo_data.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;
    info!("user {} updated todo {}", user.id, todo.id);

    Ok(HttpResponse::Ok().json(todo))
}

/// Deletes a todo. Only the owner can delete it.
#[delete("/{id}")]
pub async fn delete_todo(
    todos: web::Data<dyn TodoStore>,
    user: AuthenticatedUser,
    todo_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let todo_id = todo_id.into_inner();
    if !todos.delete_todo(todo_id, user.id).await? {
        return Err(AppError::NotFound("Todo not found".into()));
    }
    info!("user {} deleted todo {}", user.id, todo_id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Todo successfully deleted" })))
}
