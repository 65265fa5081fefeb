//! Input checks shared by the registration, booking and admin flows.
//!
//! Every check returns `BookingError::Validation` with a message that can be
//! shown next to the offending form field.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;

use crate::errors::{BookingError, BookingResult};

pub const JUSTIFICATION_MIN_CHARS: usize = 10;
pub const JUSTIFICATION_MAX_CHARS: usize = 500;
pub const NOTES_MAX_CHARS: usize = 500;

const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>_-";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Lower-cased, trimmed form under which emails are stored and looked up.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> BookingResult<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(BookingError::validation("Invalid email address"))
    }
}

pub fn validate_password(password: &str) -> BookingResult<()> {
    if password.trim().is_empty() {
        return Err(BookingError::validation("Password cannot be empty"));
    }
    let len = password.chars().count();
    if len < 8 {
        return Err(BookingError::validation("Password must have at least 8 characters"));
    }
    if len > 50 {
        return Err(BookingError::validation("Password must have at most 50 characters"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(BookingError::validation(
            "Password must contain at least one upper-case letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(BookingError::validation(
            "Password must contain at least one lower-case letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(BookingError::validation("Password must contain at least one digit"));
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Err(BookingError::validation(
            "Password must contain at least one special character",
        ));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> BookingResult<()> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len < 3 {
        return Err(BookingError::validation("Name must have at least 3 characters"));
    }
    if len > 100 {
        return Err(BookingError::validation("Name must have at most 100 characters"));
    }
    if !trimmed.contains(' ') {
        return Err(BookingError::validation("Please enter your full name"));
    }
    Ok(())
}

/// Accepts masked input such as `(84) 99999-9999`; only the digits count.
pub fn validate_phone(phone: &str) -> BookingResult<()> {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if digits == 10 || digits == 11 {
        Ok(())
    } else {
        Err(BookingError::validation("Phone number must have 10 or 11 digits"))
    }
}

pub fn validate_birth_date(birth_date: NaiveDate, today: NaiveDate) -> BookingResult<()> {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    if age < 16 {
        return Err(BookingError::validation("You must be at least 16 years old"));
    }
    if age > 120 {
        return Err(BookingError::validation("Invalid birth date"));
    }
    Ok(())
}

/// Brazilian taxpayer number (CPF) check-digit validation.
///
/// No account field stores a CPF; this is exported for clients that collect
/// one alongside the registration form.
pub fn validate_cpf(cpf: &str) -> BookingResult<()> {
    let invalid = || BookingError::validation("Invalid CPF");
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 || digits.iter().all(|d| *d == digits[0]) {
        return Err(invalid());
    }

    let check = |len: usize| -> u32 {
        let weight_start = len as u32 + 1;
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (weight_start - i as u32))
            .sum();
        match (sum * 10) % 11 {
            10 => 0,
            r => r,
        }
    };

    if check(9) != digits[9] || check(10) != digits[10] {
        return Err(invalid());
    }
    Ok(())
}

/// Returns the trimmed justification when its length is acceptable.
pub fn validate_justification(text: &str) -> BookingResult<String> {
    let trimmed = text.trim();
    let len = trimmed.chars().count();
    if len < JUSTIFICATION_MIN_CHARS {
        return Err(BookingError::validation(format!(
            "Justification must have at least {JUSTIFICATION_MIN_CHARS} characters"
        )));
    }
    if len > JUSTIFICATION_MAX_CHARS {
        return Err(BookingError::validation(format!(
            "Justification must have at most {JUSTIFICATION_MAX_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Blank notes are stored as absent.
pub fn normalize_notes(notes: Option<&str>) -> BookingResult<Option<String>> {
    match notes.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.chars().count() > NOTES_MAX_CHARS => Err(BookingError::validation(
            format!("Notes must have at most {NOTES_MAX_CHARS} characters"),
        )),
        Some(text) => Ok(Some(text.to_string())),
    }
}

pub fn validate_service_fields(
    name: Option<&str>,
    price: Option<Decimal>,
    duration: Option<i32>,
) -> BookingResult<()> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(BookingError::validation("Service name cannot be empty"));
        }
    }
    if let Some(price) = price {
        if price <= Decimal::ZERO {
            return Err(BookingError::validation("Price must be greater than zero"));
        }
    }
    if let Some(duration) = duration {
        if duration <= 0 {
            return Err(BookingError::validation("Duration must be a positive number of minutes"));
        }
    }
    Ok(())
}
