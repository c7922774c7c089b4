use crate::auth::extractors::AuthenticatedUser;
use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's identifier.
    pub sub: Uuid,
    /// Email of the user at the time the token was issued.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

impl Claims {
    pub fn identity(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            id: self.sub,
            email: self.email.clone(),
        }
    }
}

/// Issues and verifies HS256 bearer tokens.
///
/// The signing secret and token lifetime are fixed at construction; there is no
/// key rotation and no revocation list. Expiry is checked with zero leeway.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Signs a token for `identity` that expires `ttl` after now.
    ///
    /// Returns `AppError::InternalServerError` if encoding fails.
    pub fn issue(&self, identity: &AuthenticatedUser) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::InternalServerError("Token expiry overflow".into()))?;

        let claims = Claims {
            sub: identity.id,
            email: identity.email.clone(),
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))?;
        debug!("issued token for user {}", identity.id);
        Ok(token)
    }

    /// Verifies the signature and expiry of `token` and returns its claims.
    ///
    /// Returns `AppError::Unauthorized` if the token is malformed, signed with
    /// another secret, or expired.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}
