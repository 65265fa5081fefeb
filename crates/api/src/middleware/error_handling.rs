//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and the JSON envelope used by
//! every endpoint (`{ "success": false, "error": "..." }`).
//!
//! Persistence and internal failures are logged with their full cause and
//! reported to the caller as a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use salon_core::{errors::BookingError, models::response::ApiResponse};
use tracing::error;

pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use salon_api::middleware::error_handling::AppError;
/// use salon_core::errors::BookingError;
///
/// async fn handler(found: bool) -> Result<Json<&'static str>, AppError> {
///     if !found {
///         return Err(BookingError::not_found("Service not found").into());
///     }
///     Ok(Json("ok"))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub BookingError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::Authentication(_) => StatusCode::UNAUTHORIZED,
            BookingError::Authorization(_) => StatusCode::FORBIDDEN,
            BookingError::Conflict(_) => StatusCode::CONFLICT,
            BookingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BookingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text shown to the caller, without the variant prefix.
    fn client_message(&self) -> String {
        match &self.0 {
            BookingError::NotFound(msg)
            | BookingError::Validation(msg)
            | BookingError::Authentication(msg)
            | BookingError::Authorization(msg)
            | BookingError::Conflict(msg) => msg.clone(),
            BookingError::Database(_) | BookingError::Internal(_) => {
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if self.0.is_internal() {
            error!("Request failed: {:?}", self.0);
        }

        let body = Json(ApiResponse::error(self.client_message()));
        (status, body).into_response()
    }
}

/// Allows `?` on `BookingResult` inside handlers.
impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}

/// Store calls return `eyre::Result`; any failure there is a database error.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(BookingError::Database(err))
    }
}

pub fn map_error(err: BookingError) -> Response {
    AppError(err).into_response()
}
