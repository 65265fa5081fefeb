//! # Account Handlers
//!
//! Registration, sign-in, the current identity and the password-reset flow.
//!
//! The forgot-password endpoint answers identically whether or not the email
//! belongs to an account. Reset links are written to the log; they are only
//! returned in the response when `EXPOSE_RESET_TOKEN` is enabled.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::Duration;
use salon_core::{
    availability::parse_date,
    errors::BookingError,
    models::{
        password_reset::{
            ForgotPasswordRequest, PasswordReset, ResetLink, ResetPasswordRequest, ResetTokenInfo,
            ResetTokenQuery,
        },
        response::ApiResponse,
        user::{LoginRequest, LoginResponse, RegisterRequest, Role, User},
    },
    validation,
};
use salon_db::models::NewUser;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    ApiState,
    handlers::required,
    middleware::{
        auth::{self, AuthUser},
        error_handling::AppError,
        extract::{JsonBody, QueryParams},
    },
};

pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists for this email, a reset link has been sent";

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), AppError> {
    let name = required(payload.name.as_deref(), "Name is required")?;
    let email = validation::normalize_email(&required(
        payload.email.as_deref(),
        "Email is required",
    )?);
    let password = payload.password.unwrap_or_default();

    validation::validate_name(&name)?;
    validation::validate_email(&email)?;
    validation::validate_password(&password)?;

    let phone = match payload.phone.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(phone) => {
            validation::validate_phone(phone)?;
            Some(phone.to_string())
        }
    };
    let birth_date = match payload.birth_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let date = parse_date(raw)?;
            validation::validate_birth_date(date, state.calendar().today(state.clock.now()))?;
            Some(date)
        }
    };

    let password_hash = auth::hash_password(&password)?;
    let created = state
        .store
        .create_user(&NewUser {
            name,
            email,
            password_hash,
            phone,
            birth_date,
            role: Role::Client.as_str().to_string(),
        })
        .await?
        .ok_or_else(|| BookingError::conflict("An account with this email already exists"))?;

    info!("Registered user {}", created.id);
    let user = User::try_from(created)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(user).with_message("Account created")),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let email = validation::normalize_email(&required(
        payload.email.as_deref(),
        "Email is required",
    )?);
    let password = required(payload.password.as_deref(), "Password is required")?;
    let invalid = || BookingError::Authentication("Invalid email or password".to_string());

    let Some(row) = state.store.find_user_by_email(&email).await? else {
        warn!("Failed sign-in for unknown email");
        return Err(invalid().into());
    };
    if !auth::verify_password(&password, &row.password_hash)? {
        warn!("Failed sign-in for user {}", row.id);
        return Err(invalid().into());
    }

    let user = User::try_from(row)?;
    let token = auth::issue_token(
        user.id,
        user.role,
        state.clock.now(),
        state.config.session_ttl_hours,
        &state.config.jwt_secret,
    )?;

    Ok(Json(ApiResponse::ok(LoginResponse { token, user })))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<Arc<ApiState>>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let row = state
        .store
        .find_user(caller.user_id)
        .await?
        .ok_or_else(|| BookingError::not_found("User not found"))?;

    Ok(Json(ApiResponse::ok(User::try_from(row)?)))
}

#[axum::debug_handler]
pub async fn forgot_password(
    State(state): State<Arc<ApiState>>,
    JsonBody(payload): JsonBody<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<ResetLink>>, AppError> {
    let email = validation::normalize_email(&required(
        payload.email.as_deref(),
        "Email is required",
    )?);
    validation::validate_email(&email)?;

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        return Ok(Json(
            ApiResponse::maybe(None).with_message(FORGOT_PASSWORD_MESSAGE),
        ));
    };

    let now = state.clock.now();
    let token = auth::generate_reset_token();
    let expires_at = Duration::try_minutes(state.config.reset_token_ttl_minutes)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| eyre::eyre!("Reset token lifetime is out of range"))?;
    let reset = state
        .store
        .issue_password_reset(user.id, &token, expires_at, now)
        .await?;

    let reset_url = format!(
        "{}/reset-password?token={}",
        state.config.public_base_url, reset.token
    );
    info!("Password reset link for user {}: {}", user.id, reset_url);

    let link = state.config.expose_reset_token.then(|| ResetLink {
        reset_url,
        token: reset.token,
    });
    Ok(Json(
        ApiResponse::maybe(link).with_message(FORGOT_PASSWORD_MESSAGE),
    ))
}

/// Looks up a reset token and checks it is neither used nor expired.
async fn usable_reset(state: &ApiState, token: Option<&str>) -> Result<PasswordReset, AppError> {
    let token = required(token, "Reset token is required")?;
    let reset: PasswordReset = state
        .store
        .find_password_reset(&token)
        .await?
        .ok_or_else(|| BookingError::validation("Invalid reset link"))?
        .into();
    reset.ensure_usable(state.clock.now())?;
    Ok(reset)
}

#[axum::debug_handler]
pub async fn validate_reset_token(
    State(state): State<Arc<ApiState>>,
    QueryParams(query): QueryParams<ResetTokenQuery>,
) -> Result<Json<ApiResponse<ResetTokenInfo>>, AppError> {
    let reset = usable_reset(&state, query.token.as_deref()).await?;
    let user = state
        .store
        .find_user(reset.user_id)
        .await?
        .ok_or_else(|| BookingError::not_found("User not found"))?;

    Ok(Json(ApiResponse::ok(ResetTokenInfo {
        email: user.email,
        name: user.name,
    })))
}

#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<Arc<ApiState>>,
    JsonBody(payload): JsonBody<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let reset = usable_reset(&state, payload.token.as_deref()).await?;
    let password = payload.password.unwrap_or_default();
    validation::validate_password(&password)?;

    let password_hash = auth::hash_password(&password)?;
    let consumed = state
        .store
        .consume_password_reset(reset.id, reset.user_id, &password_hash)
        .await?;
    if !consumed {
        return Err(BookingError::validation("This reset link has already been used").into());
    }

    info!("Password reset completed for user {}", reset.user_id);
    Ok(Json(ApiResponse::message("Password updated, you can now sign in")))
}
