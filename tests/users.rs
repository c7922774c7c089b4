mod common;

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{test, App};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use todo_api::auth::verify_password;
use todo_api::models::User;
use todo_api::routes;
use todo_api::store::{MemoryStore, UserStore};
use uuid::Uuid;

#[actix_rt::test]
async fn test_register_stores_hashed_password() {
    let store = Arc::new(MemoryStore::new());
    let app = test::init_service(
        App::new()
            .wrap(Logger::default())
            .configure(routes::configure_app(store.clone(), common::tokens())),
    )
    .await;

    let registered = common::register(&app, "alice", "a@x.com", "secret123")
        .await
        .expect("registration should succeed");
    assert_eq!(registered.message, "User created successfully");
    assert_eq!(registered.user.username, "alice");
    assert_eq!(registered.user.email, "a@x.com");

    let stored = store
        .find_user_by_email("a@x.com")
        .await
        .unwrap()
        .expect("user should be stored");
    assert_eq!(stored.id, registered.user.id);
    assert!(stored.password_hash != "secret123");
    assert!(verify_password("secret123", &stored.password_hash).unwrap());
}

#[actix_rt::test]
async fn test_register_response_never_exposes_password() {
    let store = Arc::new(MemoryStore::new());
    let app = test::init_service(
        App::new().configure(routes::configure_app(store.clone(), common::tokens())),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/user")
        .set_json(json!({ "username": "alice", "email": "a@x.com", "password": "secret123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());

    let req = test::TestRequest::get().uri("/user").to_request();
    let resp = test::call_service(&app, req).await;
    let listed: Value = test::read_body_json(resp).await;
    assert!(listed[0].get("passwordHash").is_none());
}

#[actix_rt::test]
async fn test_invalid_registration_inputs() {
    let store = Arc::new(MemoryStore::new());
    let app = test::init_service(
        App::new().configure(routes::configure_app(store.clone(), common::tokens())),
    )
    .await;

    common::register(&app, "taken", "taken@x.com", "secret123")
        .await
        .expect("setup registration should succeed");

    let test_cases = vec![
        (
            json!({ "email": "test@example.com", "password": "Password123!" }),
            StatusCode::BAD_REQUEST,
            "missing username",
        ),
        (
            json!({ "username": "testuser", "password": "Password123!" }),
            StatusCode::BAD_REQUEST,
            "missing email",
        ),
        (
            json!({ "username": "testuser", "email": "test@example.com" }),
            StatusCode::BAD_REQUEST,
            "missing password",
        ),
        (
            json!({ "username": "testuser", "email": "test@example.com", "password": "" }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "empty password",
        ),
        (
            json!({ "username": "testuser", "email": "invalid-email", "password": "Password123!" }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid email format",
        ),
        (
            json!({ "username": "", "email": "test@example.com", "password": "Password123!" }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "empty username",
        ),
        (
            json!({ "username": "   ", "email": "test@example.com", "password": "Password123!" }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "whitespace-only username",
        ),
        (
            json!({ "username": "taken", "email": "new@x.com", "password": "Password123!" }),
            StatusCode::BAD_REQUEST,
            "duplicate username",
        ),
        (
            json!({ "username": "fresh", "email": "taken@x.com", "password": "Password123!" }),
            StatusCode::BAD_REQUEST,
            "duplicate email",
        ),
    ];

    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/user")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body = test::read_body(resp).await;

        assert_eq!(
            status,
            expected_status,
            "Test case failed: {}. Body: {:?}",
            description,
            String::from_utf8_lossy(&body)
        );
        let json: Value = serde_json::from_slice(&body).expect("error bodies are JSON");
        assert!(json["message"].is_string(), "{} should carry a message", description);
    }

    assert_eq!(store.list_users().await.unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_login_flow() {
    let store = Arc::new(MemoryStore::new());
    let tokens = common::tokens();
    let app = test::init_service(
        App::new().configure(routes::configure_app(store.clone(), tokens.clone())),
    )
    .await;

    let registered = common::register(&app, "alice", "a@x.com", "secret123")
        .await
        .unwrap();

    let test_cases = vec![
        (
            json!({ "email": "a@x.com", "password": "wrong-password" }),
            StatusCode::UNAUTHORIZED,
            "incorrect password",
        ),
        (
            json!({ "email": "nobody@x.com", "password": "secret123" }),
            StatusCode::UNAUTHORIZED,
            "non-existent user",
        ),
        (
            json!({ "password": "secret123" }),
            StatusCode::BAD_REQUEST,
            "missing email",
        ),
        (
            json!({ "email": "a@x.com", "password": "" }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "empty password",
        ),
    ];
    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/user/login")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected_status, "Test case failed: {}", description);
    }

    let auth = common::login(&app, "a@x.com", "secret123")
        .await
        .expect("login with correct credentials should succeed");
    assert_eq!(auth.message, "Authentication successful");
    assert!(!auth.token.is_empty(), "Token should be a non-empty string");

    let claims = tokens.verify(&auth.token).unwrap();
    assert_eq!(claims.sub, registered.user.id);
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[actix_rt::test]
async fn test_user_crud_flow() {
    let store = Arc::new(MemoryStore::new());
    let app = test::init_service(
        App::new().configure(routes::configure_app(store.clone(), common::tokens())),
    )
    .await;

    let alice = common::register(&app, "alice", "a@x.com", "secret123")
        .await
        .unwrap()
        .user;
    common::register(&app, "bob", "b@x.com", "hunter22")
        .await
        .unwrap();

    // List
    let req = test::TestRequest::get().uri("/user").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<User> = test::read_body_json(resp).await;
    assert_eq!(users.len(), 2);

    // Get by id
    let req = test::TestRequest::get()
        .uri(&format!("/user/{}", alice.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: User = test::read_body_json(resp).await;
    assert_eq!(fetched.username, "alice");

    // Update username only: password hash untouched
    let before = store.find_user(alice.id).await.unwrap().unwrap();
    let req = test::TestRequest::put()
        .uri(&format!("/user/{}", alice.id))
        .set_json(json!({ "username": "alicia" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User updated successfully");
    assert_eq!(body["user"]["username"], "alicia");
    assert_eq!(body["user"]["email"], "a@x.com");
    let after = store.find_user(alice.id).await.unwrap().unwrap();
    assert_eq!(after.password_hash, before.password_hash);

    // Whitespace-only username is rejected and nothing changes
    let req = test::TestRequest::put()
        .uri(&format!("/user/{}", alice.id))
        .set_json(json!({ "username": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let unchanged = store.find_user(alice.id).await.unwrap().unwrap();
    assert_eq!(unchanged.username, "alicia");

    // Update password: re-hashed, old one no longer logs in
    let req = test::TestRequest::put()
        .uri(&format!("/user/{}", alice.id))
        .set_json(json!({ "password": "n3w-secret" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let after = store.find_user(alice.id).await.unwrap().unwrap();
    assert!(after.password_hash != "n3w-secret");
    assert!(verify_password("n3w-secret", &after.password_hash).unwrap());
    assert!(common::login(&app, "a@x.com", "secret123").await.is_err());
    assert!(common::login(&app, "a@x.com", "n3w-secret").await.is_ok());

    // Update to another user's email
    let req = test::TestRequest::put()
        .uri(&format!("/user/{}", alice.id))
        .set_json(json!({ "email": "b@x.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Delete
    let req = test::TestRequest::delete()
        .uri(&format!("/user/{}", alice.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User deleted successfully");

    let req = test::TestRequest::get()
        .uri(&format!("/user/{}", alice.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_unknown_and_malformed_user_ids() {
    let store = Arc::new(MemoryStore::new());
    let app = test::init_service(
        App::new().configure(routes::configure_app(store.clone(), common::tokens())),
    )
    .await;

    let missing = Uuid::new_v4();
    for req in [
        test::TestRequest::get().uri(&format!("/user/{}", missing)),
        test::TestRequest::delete().uri(&format!("/user/{}", missing)),
        test::TestRequest::put()
            .uri(&format!("/user/{}", missing))
            .set_json(json!({ "username": "ghost" })),
        test::TestRequest::get().uri("/user/not-a-uuid"),
    ] {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].is_string());
    }
}
