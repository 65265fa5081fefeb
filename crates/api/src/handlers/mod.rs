pub mod admin;
pub mod appointments;
pub mod auth;
pub mod services;
pub mod slots;

use salon_core::errors::{BookingError, BookingResult};

/// Trimmed value of a mandatory text field.
pub(crate) fn required(value: Option<&str>, message: &str) -> BookingResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(BookingError::validation(message)),
    }
}
