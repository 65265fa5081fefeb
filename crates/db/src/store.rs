//! # Persistence gateway
//!
//! [`BookingStore`] is the only way the rest of the service reaches stored
//! state. Each method is a single logical read or write; the multi-statement
//! sequences that must not interleave (password-reset issuance and
//! consumption) are one method each so that implementations can make them
//! atomic.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::Result;
use mockall::automock;
use salon_core::models::appointment::AppointmentStatus;
use uuid::Uuid;

use crate::{
    DbPool,
    models::{
        DbAppointment, DbAppointmentDetail, DbAvailableSlot, DbPasswordReset, DbService, DbUser,
        NewAppointment, NewService, NewUser, ServiceChanges,
    },
    repositories,
};

#[automock]
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<DbUser>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<DbUser>>;

    /// `None` when the email is taken.
    async fn create_user(&self, user: &NewUser) -> Result<Option<DbUser>>;

    async fn list_services(&self, active_only: bool) -> Result<Vec<DbService>>;

    async fn find_service(&self, id: Uuid) -> Result<Option<DbService>>;

    async fn create_service(&self, service: &NewService) -> Result<DbService>;

    async fn update_service(&self, id: Uuid, changes: &ServiceChanges)
        -> Result<Option<DbService>>;

    async fn list_slots(&self) -> Result<Vec<DbAvailableSlot>>;

    /// Active template rows for the weekday, ascending by time.
    async fn find_active_slots_by_weekday(&self, day_of_week: i16)
        -> Result<Vec<DbAvailableSlot>>;

    /// `None` when the weekday already has this time.
    async fn create_slot(&self, day_of_week: i16, time: &str) -> Result<Option<DbAvailableSlot>>;

    async fn set_slot_active(&self, id: Uuid, active: bool) -> Result<Option<DbAvailableSlot>>;

    async fn delete_slot(&self, id: Uuid) -> Result<bool>;

    async fn find_appointment(&self, id: Uuid) -> Result<Option<DbAppointment>>;

    async fn find_appointments_by_date_and_statuses(
        &self,
        date: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<DbAppointment>>;

    async fn list_appointments_for_user(&self, user_id: Uuid) -> Result<Vec<DbAppointmentDetail>>;

    async fn list_appointments(
        &self,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<DbAppointmentDetail>>;

    /// Inserts a PENDING appointment; `None` when the slot is already held.
    async fn create_appointment(&self, appointment: &NewAppointment)
        -> Result<Option<DbAppointment>>;

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Option<DbAppointment>>;

    /// Conditional on NO_SHOW and no previous justification.
    async fn update_appointment_justification(
        &self,
        id: Uuid,
        justification: &str,
        justified_at: DateTime<Utc>,
    ) -> Result<Option<DbAppointment>>;

    async fn delete_appointment(&self, id: Uuid) -> Result<bool>;

    async fn find_password_reset(&self, token: &str) -> Result<Option<DbPasswordReset>>;

    async fn issue_password_reset(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<DbPasswordReset>;

    /// `false` when the token was consumed by someone else first.
    async fn consume_password_reset(
        &self,
        reset_id: Uuid,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool>;
}

/// [`BookingStore`] backed by the Postgres repositories.
#[derive(Debug, Clone)]
pub struct PgBookingStore {
    pool: DbPool,
}

impl PgBookingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<DbUser>> {
        repositories::user::get_user_by_id(&self.pool, id).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<DbUser>> {
        repositories::user::get_user_by_email(&self.pool, email).await
    }

    async fn create_user(&self, user: &NewUser) -> Result<Option<DbUser>> {
        repositories::user::create_user(&self.pool, user).await
    }

    async fn list_services(&self, active_only: bool) -> Result<Vec<DbService>> {
        repositories::service::list_services(&self.pool, active_only).await
    }

    async fn find_service(&self, id: Uuid) -> Result<Option<DbService>> {
        repositories::service::get_service_by_id(&self.pool, id).await
    }

    async fn create_service(&self, service: &NewService) -> Result<DbService> {
        repositories::service::create_service(&self.pool, service).await
    }

    async fn update_service(
        &self,
        id: Uuid,
        changes: &ServiceChanges,
    ) -> Result<Option<DbService>> {
        repositories::service::update_service(&self.pool, id, changes).await
    }

    async fn list_slots(&self) -> Result<Vec<DbAvailableSlot>> {
        repositories::slot::list_slots(&self.pool).await
    }

    async fn find_active_slots_by_weekday(
        &self,
        day_of_week: i16,
    ) -> Result<Vec<DbAvailableSlot>> {
        repositories::slot::get_active_slots_by_weekday(&self.pool, day_of_week).await
    }

    async fn create_slot(&self, day_of_week: i16, time: &str) -> Result<Option<DbAvailableSlot>> {
        repositories::slot::create_slot(&self.pool, day_of_week, time).await
    }

    async fn set_slot_active(&self, id: Uuid, active: bool) -> Result<Option<DbAvailableSlot>> {
        repositories::slot::set_slot_active(&self.pool, id, active).await
    }

    async fn delete_slot(&self, id: Uuid) -> Result<bool> {
        repositories::slot::delete_slot(&self.pool, id).await
    }

    async fn find_appointment(&self, id: Uuid) -> Result<Option<DbAppointment>> {
        repositories::appointment::get_appointment_by_id(&self.pool, id).await
    }

    async fn find_appointments_by_date_and_statuses(
        &self,
        date: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<DbAppointment>> {
        repositories::appointment::get_appointments_by_date_and_statuses(&self.pool, date, statuses)
            .await
    }

    async fn list_appointments_for_user(&self, user_id: Uuid) -> Result<Vec<DbAppointmentDetail>> {
        repositories::appointment::list_appointments_for_user(&self.pool, user_id).await
    }

    async fn list_appointments(
        &self,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<DbAppointmentDetail>> {
        repositories::appointment::list_appointments(&self.pool, status).await
    }

    async fn create_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<Option<DbAppointment>> {
        repositories::appointment::create_appointment(&self.pool, appointment).await
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Option<DbAppointment>> {
        repositories::appointment::update_appointment_status(&self.pool, id, status).await
    }

    async fn update_appointment_justification(
        &self,
        id: Uuid,
        justification: &str,
        justified_at: DateTime<Utc>,
    ) -> Result<Option<DbAppointment>> {
        repositories::appointment::update_appointment_justification(
            &self.pool,
            id,
            justification,
            justified_at,
        )
        .await
    }

    async fn delete_appointment(&self, id: Uuid) -> Result<bool> {
        repositories::appointment::delete_appointment(&self.pool, id).await
    }

    async fn find_password_reset(&self, token: &str) -> Result<Option<DbPasswordReset>> {
        repositories::password_reset::get_password_reset_by_token(&self.pool, token).await
    }

    async fn issue_password_reset(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<DbPasswordReset> {
        repositories::password_reset::issue_password_reset(
            &self.pool, user_id, token, expires_at, now,
        )
        .await
    }

    async fn consume_password_reset(
        &self,
        reset_id: Uuid,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool> {
        repositories::password_reset::consume_password_reset(
            &self.pool,
            reset_id,
            user_id,
            password_hash,
        )
        .await
    }
}
