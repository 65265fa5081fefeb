pub mod appointment;
pub mod password_reset;
pub mod service;
pub mod slot;
pub mod user;

use std::fmt;

/// Raised when a write would leave two pending or confirmed appointments on
/// the same (date, time).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOccupied;

impl fmt::Display for SlotOccupied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an active appointment already holds this date and time")
    }
}

impl std::error::Error for SlotOccupied {}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
