use chrono::{DateTime, NaiveDate, Utc};
use eyre::Report;
use rust_decimal::Decimal;
use salon_core::models::{
    appointment::{Appointment, AppointmentDetails},
    password_reset::PasswordReset,
    service::{Service, ServiceSummary},
    slot::AvailableSlot,
    user::{User, UserSummary},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbService {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub duration_minutes: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAvailableSlot {
    pub id: Uuid,
    pub day_of_week: i16,
    pub time_slot: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub status: String,
    pub notes: Option<String>,
    pub justification: Option<String>,
    pub justified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Appointment row joined with its service and owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointmentDetail {
    #[sqlx(flatten)]
    pub appointment: DbAppointment,
    pub service_name: String,
    pub service_price: Decimal,
    pub service_duration: i32,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPasswordReset {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

// Write inputs

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewService {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub duration_minutes: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub notes: Option<String>,
}

// Row to domain conversions

impl TryFrom<DbUser> for User {
    type Error = Report;

    fn try_from(row: DbUser) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            birth_date: row.birth_date,
            role: row.role.parse()?,
            created_at: row.created_at,
        })
    }
}

impl From<DbService> for Service {
    fn from(row: DbService) -> Self {
        Service {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            duration: row.duration_minutes,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

impl From<DbAvailableSlot> for AvailableSlot {
    fn from(row: DbAvailableSlot) -> Self {
        AvailableSlot {
            id: row.id,
            day_of_week: row.day_of_week,
            time: row.time_slot,
            active: row.active,
        }
    }
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = Report;

    fn try_from(row: DbAppointment) -> Result<Self, Self::Error> {
        Ok(Appointment {
            id: row.id,
            user_id: row.user_id,
            service_id: row.service_id,
            date: row.appointment_date,
            time: row.appointment_time,
            status: row.status.parse()?,
            notes: row.notes,
            justification: row.justification,
            justified_at: row.justified_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl DbAppointmentDetail {
    /// Client listings omit the owner; admin listings include it.
    pub fn into_details(self, include_user: bool) -> eyre::Result<AppointmentDetails> {
        let user = include_user.then(|| UserSummary {
            id: self.appointment.user_id,
            name: self.user_name,
            email: self.user_email,
            phone: self.user_phone,
        });
        let service = ServiceSummary {
            id: self.appointment.service_id,
            name: self.service_name,
            price: self.service_price,
            duration: self.service_duration,
        };
        Ok(AppointmentDetails {
            appointment: self.appointment.try_into()?,
            service,
            user,
        })
    }
}

impl From<DbPasswordReset> for PasswordReset {
    fn from(row: DbPasswordReset) -> Self {
        PasswordReset {
            id: row.id,
            token: row.token,
            user_id: row.user_id,
            expires_at: row.expires_at,
            used: row.used,
            created_at: row.created_at,
        }
    }
}
