//! # Authentication Module
//!
//! Password hashing, session tokens and the request extractors that carry the
//! caller's identity into handlers.
//!
//! Passwords are hashed with Argon2 and stored in PHC string format. Sessions
//! are HS256 JSON Web Tokens whose `sub` is the user id. Every authenticated
//! request re-reads the account, so a deleted user or a changed role takes
//! effect immediately.

use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use eyre::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use salon_core::{errors::BookingError, models::user::Role};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

/// Hashes a password using the Argon2 algorithm
///
/// A fresh random salt is generated for every call; the result is a PHC
/// string carrying algorithm, parameters, salt and hash.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// `Ok(false)` on a mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| eyre::eyre!("Stored password hash is malformed: {}", e))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(eyre::eyre!("Error verifying password: {}", e)),
    }
}

/// 32 random bytes, hex encoded.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub role: String,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

pub fn issue_token(
    user_id: Uuid,
    role: Role,
    now: DateTime<Utc>,
    ttl_hours: i64,
    secret: &str,
) -> Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: Duration::try_hours(ttl_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| eyre::eyre!("Session lifetime of {} hours is out of range", ttl_hours))?
            .timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| eyre::eyre!("Failed to sign session token: {}", e))
}

/// Checks signature and expiry. Expiry is compared against `now` rather than
/// the system clock so that it follows the service's [`Clock`](salon_core::clock::Clock).
pub fn decode_token(token: &str, secret: &str, now: DateTime<Utc>) -> Result<Claims, BookingError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        warn!("Rejected session token: {}", e);
        BookingError::Authentication("Invalid session token".to_string())
    })?;

    if claims.exp <= now.timestamp() {
        return Err(BookingError::Authentication(
            "Session expired, please sign in again".to_string(),
        ));
    }
    Ok(claims)
}

/// Identity of the caller, resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| BookingError::Authentication("Not authenticated".to_string()))?;

        let claims = decode_token(token, &state.config.jwt_secret, state.clock.now())?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| BookingError::Authentication("Invalid session token".to_string()))?;

        let user = state.store.find_user(user_id).await?.ok_or_else(|| {
            warn!("Session token for unknown user {}", user_id);
            BookingError::Authentication("Session is no longer valid".to_string())
        })?;
        let role = user.role.parse::<Role>()?;

        Ok(AuthUser { user_id, role })
    }
}

/// An [`AuthUser`] whose account has the ADMIN role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            warn!("User {} attempted an admin operation", user.user_id);
            return Err(BookingError::Authorization("Administrator access required".to_string()).into());
        }
        Ok(AdminUser(user))
    }
}
