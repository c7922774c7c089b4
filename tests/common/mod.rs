#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::test;
use chrono::Duration;
use serde_json::{json, Value};
use todo_api::auth::{AuthResponse, TokenService};
use todo_api::routes::users::UserResponse;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn tokens() -> TokenService {
    TokenService::new(TEST_SECRET, Duration::hours(1))
}

pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

pub async fn register(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    email: &str,
    password: &str,
) -> Result<UserResponse, String> {
    let req = test::TestRequest::post()
        .uri("/user")
        .set_json(json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    if status != actix_web::http::StatusCode::CREATED {
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    serde_json::from_slice(&body).map_err(|e| format!("Failed to parse registration response: {}", e))
}

pub async fn login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> Result<AuthResponse, String> {
    let req = test::TestRequest::post()
        .uri("/user/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    if !status.is_success() {
        return Err(format!(
            "Failed to log in. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    serde_json::from_slice(&body).map_err(|e| format!("Failed to parse login response: {}", e))
}

pub async fn register_and_login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    email: &str,
    password: &str,
) -> Result<TestUser, String> {
    let registered = register(app, username, email, password).await?;
    let auth = login(app, email, password).await?;
    Ok(TestUser {
        id: registered.user.id,
        token: auth.token,
    })
}

pub fn todo_payload(titulo: &str) -> Value {
    json!({
        "titulo": titulo,
        "description": "Something to do",
        "startDate": "2024-05-01T09:00:00Z",
        "endDate": "2024-05-02T18:00:00Z"
    })
}
