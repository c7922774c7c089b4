use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderMap, HeaderValue},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::{debug, warn};
use serde_json::Value;

use crate::auth::extractors::AuthenticatedUser;
use crate::auth::password::hash_password;
use crate::auth::token::TokenService;
use crate::error::AppError;

/// Body field rewritten by `HashPassword`.
pub const PASSWORD_FIELD: &str = "password";

/// Returns the token of an `Authorization: Bearer <token>` header, if any.
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let (scheme, token) = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    Some(token.trim()).filter(|token| !token.is_empty())
}

/// Rejects requests without a valid bearer token and attaches the decoded
/// `AuthenticatedUser` to the request extensions otherwise.
///
/// The `TokenService` is read from app data (`web::Data<TokenService>`).
/// The store is never consulted: the identity is trusted for the token's lifetime.
pub struct BearerAuth;

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = BearerAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthService { service }))
    }
}

pub struct BearerAuthService<S> {
    service: S,
}

fn authenticate(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| AppError::InternalServerError("Token service is not configured".into()))?;
    let token = bearer_token(req.headers())
        .ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;
    let claims = tokens.verify(token)?;
    Ok(claims.identity())
}

impl<S, B> Service<ServiceRequest> for BearerAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(user) => {
                debug!("authenticated user {} for {}", user.id, req.path());
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(app_err) => {
                warn!("rejected {} {}: {}", req.method(), req.path(), app_err);
                let res = req
                    .into_response(app_err.error_response())
                    .map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}

/// Replaces a plaintext `password` in a JSON request body with its bcrypt hash
/// before the wrapped handler runs.
///
/// Bodies that are not JSON objects, or that carry no non-empty string password,
/// are forwarded unchanged. A hashing failure short-circuits with a 500.
pub struct HashPassword;

impl<S, B> Transform<S, ServiceRequest> for HashPassword
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = HashPasswordService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HashPasswordService {
            service: Rc::new(service),
        }))
    }
}

pub struct HashPasswordService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for HashPasswordService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            match replace_request_password(&mut req).await {
                Ok(()) => service
                    .call(req)
                    .await
                    .map(ServiceResponse::map_into_left_body),
                Err(app_err) => Ok(req
                    .into_response(app_err.error_response())
                    .map_into_right_body()),
            }
        })
    }
}

async fn replace_request_password(req: &mut ServiceRequest) -> Result<(), AppError> {
    let body = req
        .extract::<web::Bytes>()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let body = hash_password_field(body).await?;

    req.headers_mut()
        .insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
    let (_, mut payload) = actix_http::h1::Payload::create(true);
    payload.unread_data(body);
    req.set_payload(payload.into());
    Ok(())
}

/// Rewrites the `password` field of a JSON object body with its hash.
///
/// Hashing runs on the blocking thread pool.
pub async fn hash_password_field(body: web::Bytes) -> Result<web::Bytes, AppError> {
    let mut document = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(document)) => document,
        _ => return Ok(body),
    };
    let plaintext = match document.get(PASSWORD_FIELD) {
        Some(Value::String(password)) if !password.is_empty() => password.clone(),
        _ => return Ok(body),
    };

    let hashed = web::block(move || hash_password(&plaintext)).await??;
    document.insert(PASSWORD_FIELD.to_string(), Value::String(hashed));

    let rewritten = serde_json::to_vec(&document)
        .map_err(|e| AppError::InternalServerError(format!("Failed to encode body: {}", e)))?;
    Ok(web::Bytes::from(rewritten))
}
