use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl PasswordReset {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.used && now <= self.expires_at
    }

    /// Rejects a token that was already consumed or has expired.
    pub fn ensure_usable(&self, now: DateTime<Utc>) -> BookingResult<()> {
        if self.used {
            return Err(BookingError::validation("This reset link has already been used"));
        }
        if now > self.expires_at {
            return Err(BookingError::validation(
                "This reset link has expired. Request a new one",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

/// Only returned when the service runs with reset-token exposure enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetLink {
    pub reset_url: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetTokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetTokenInfo {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub password: Option<String>,
}
