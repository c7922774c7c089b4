use crate::{
    auth::{verify_password, AuthResponse, AuthenticatedUser, HashPassword, LoginRequest, TokenService},
    error::AppError,
    models::{User, UserInput, UserUpdate},
    store::UserStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Envelope returned by user write operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub message: String,
    pub user: User,
}

/// Register a new user.
///
/// The plaintext password has already been hashed by `HashPassword`.
///
/// ## Responses:
/// - `201 Created`: `{ message, user }`.
/// - `400 Bad Request`: malformed body, or username/email already registered.
/// - `422 Unprocessable Entity`: a field failed validation.
#[post("", wrap = "HashPassword")]
pub async fn create_user(
    users: web::Data<dyn UserStore>,
    user_data: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    user_data.validate()?;

    let user = users.create_user(user_data.into_inner().into()).await?;
    info!("registered user {}", user.id);

    Ok(HttpResponse::Created().json(UserResponse {
        message: "User created successfully".into(),
        user,
    }))
}

/// List every registered user.
#[get("")]
pub async fn list_users(users: web::Data<dyn UserStore>) -> Result<impl Responder, AppError> {
    let users = users.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Authenticate with email and password.
///
/// Unknown email and wrong password are indistinguishable to the caller (`401`).
#[post("/login")]
pub async fn login(
    users: web::Data<dyn UserStore>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;
    let LoginRequest { email, password } = login_data.into_inner();

    let user = users
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Authentication failed".into()))?;

    let stored_hash = user.password_hash.clone();
    let matches = web::block(move || verify_password(&password, &stored_hash)).await??;
    if !matches {
        return Err(AppError::Unauthorized("Authentication failed".into()));
    }

    let token = tokens.issue(&AuthenticatedUser {
        id: user.id,
        email: user.email,
    })?;
    info!("user {} logged in", user.id);

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Authentication successful".into(),
        token,
    }))
}

#[get("/{id}")]
pub async fn get_user(
    users: web::Data<dyn UserStore>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let user = users
        .find_user(user_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Ok().json(user))
}

/// Update any of username, email and password. A new password is re-hashed by
/// `HashPassword`; absent fields keep their stored values.
#[put("/{id}", wrap = "HashPassword")]
pub async fn update_user(
    users: web::Data<dyn UserStore>,
    user_id: web::Path<Uuid>,
    user_data: web::Json<UserUpdate>,
) -> Result<impl Responder, AppError> {
    user_data.validate()?;

    let user = users
        .update_user(user_id.into_inner(), user_data.into_inner().into())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    info!("updated user {}", user.id);

    Ok(HttpResponse::Ok().json(UserResponse {
        message: "User updated successfully".into(),
        user,
    }))
}

/// Delete a user together with the todos they own.
#[delete("/{id}")]
pub async fn delete_user(
    users: web::Data<dyn UserStore>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let user_id = user_id.into_inner();
    if !users.delete_user(user_id).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    info!("deleted user {}", user_id);

    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })))
}
