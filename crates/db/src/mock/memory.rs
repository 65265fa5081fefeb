use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::Result;
use salon_core::models::appointment::AppointmentStatus;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    models::{
        DbAppointment, DbAppointmentDetail, DbAvailableSlot, DbPasswordReset, DbService, DbUser,
        NewAppointment, NewService, NewUser, ServiceChanges,
    },
    repositories::SlotOccupied,
    store::BookingStore,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<DbUser>,
    services: Vec<DbService>,
    slots: Vec<DbAvailableSlot>,
    appointments: Vec<DbAppointment>,
    resets: Vec<DbPasswordReset>,
}

impl Tables {
    fn slot_held(&self, date: NaiveDate, time: &str, except: Option<Uuid>) -> bool {
        self.appointments.iter().any(|a| {
            Some(a.id) != except
                && a.appointment_date == date
                && a.appointment_time == time
                && is_occupying(&a.status)
        })
    }

    fn detail(&self, appointment: &DbAppointment) -> Result<DbAppointmentDetail> {
        let service = self
            .services
            .iter()
            .find(|s| s.id == appointment.service_id)
            .ok_or_else(|| eyre::eyre!("service {} missing", appointment.service_id))?;
        let user = self
            .users
            .iter()
            .find(|u| u.id == appointment.user_id)
            .ok_or_else(|| eyre::eyre!("user {} missing", appointment.user_id))?;

        Ok(DbAppointmentDetail {
            appointment: appointment.clone(),
            service_name: service.name.clone(),
            service_price: service.price,
            service_duration: service.duration_minutes,
            user_name: user.name.clone(),
            user_email: user.email.clone(),
            user_phone: user.phone.clone(),
        })
    }

    fn details_newest_first<'a>(
        &self,
        rows: impl Iterator<Item = &'a DbAppointment>,
    ) -> Result<Vec<DbAppointmentDetail>> {
        let mut rows: Vec<&DbAppointment> = rows.collect();
        rows.sort_by(|a, b| {
            (b.appointment_date, &b.appointment_time).cmp(&(a.appointment_date, &a.appointment_time))
        });
        rows.into_iter().map(|a| self.detail(a)).collect()
    }
}

fn is_occupying(status: &str) -> bool {
    AppointmentStatus::OCCUPYING
        .iter()
        .any(|s| s.as_str() == status)
}

/// Process-local [`BookingStore`] used by handler tests and local runs
/// without a database.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<DbUser>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<DbUser>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> Result<Option<DbUser>> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Ok(None);
        }
        let now = Utc::now();
        let row = DbUser {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            phone: user.phone.clone(),
            birth_date: user.birth_date,
            role: user.role.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.users.push(row.clone());
        Ok(Some(row))
    }

    async fn list_services(&self, active_only: bool) -> Result<Vec<DbService>> {
        let tables = self.tables.lock().await;
        let mut services: Vec<DbService> = tables
            .services
            .iter()
            .filter(|s| s.active || !active_only)
            .cloned()
            .collect();
        services.sort_by(|a, b| (a.price, &a.name).cmp(&(b.price, &b.name)));
        Ok(services)
    }

    async fn find_service(&self, id: Uuid) -> Result<Option<DbService>> {
        let tables = self.tables.lock().await;
        Ok(tables.services.iter().find(|s| s.id == id).cloned())
    }

    async fn create_service(&self, service: &NewService) -> Result<DbService> {
        let mut tables = self.tables.lock().await;
        let row = DbService {
            id: Uuid::new_v4(),
            name: service.name.clone(),
            description: service.description.clone(),
            price: service.price,
            duration_minutes: service.duration_minutes,
            active: true,
            created_at: Utc::now(),
        };
        tables.services.push(row.clone());
        Ok(row)
    }

    async fn update_service(
        &self,
        id: Uuid,
        changes: &ServiceChanges,
    ) -> Result<Option<DbService>> {
        let mut tables = self.tables.lock().await;
        let Some(service) = tables.services.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            service.name = name.clone();
        }
        if let Some(description) = &changes.description {
            service.description = description.clone();
        }
        if let Some(price) = changes.price {
            service.price = price;
        }
        if let Some(duration) = changes.duration_minutes {
            service.duration_minutes = duration;
        }
        if let Some(active) = changes.active {
            service.active = active;
        }
        Ok(Some(service.clone()))
    }

    async fn list_slots(&self) -> Result<Vec<DbAvailableSlot>> {
        let tables = self.tables.lock().await;
        let mut slots = tables.slots.clone();
        slots.sort_by(|a, b| (a.day_of_week, &a.time_slot).cmp(&(b.day_of_week, &b.time_slot)));
        Ok(slots)
    }

    async fn find_active_slots_by_weekday(
        &self,
        day_of_week: i16,
    ) -> Result<Vec<DbAvailableSlot>> {
        let tables = self.tables.lock().await;
        let mut slots: Vec<DbAvailableSlot> = tables
            .slots
            .iter()
            .filter(|s| s.day_of_week == day_of_week && s.active)
            .cloned()
            .collect();
        slots.sort_by(|a, b| a.time_slot.cmp(&b.time_slot));
        Ok(slots)
    }

    async fn create_slot(&self, day_of_week: i16, time: &str) -> Result<Option<DbAvailableSlot>> {
        let mut tables = self.tables.lock().await;
        if tables
            .slots
            .iter()
            .any(|s| s.day_of_week == day_of_week && s.time_slot == time)
        {
            return Ok(None);
        }
        let row = DbAvailableSlot {
            id: Uuid::new_v4(),
            day_of_week,
            time_slot: time.to_string(),
            active: true,
            created_at: Utc::now(),
        };
        tables.slots.push(row.clone());
        Ok(Some(row))
    }

    async fn set_slot_active(&self, id: Uuid, active: bool) -> Result<Option<DbAvailableSlot>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.slots.iter_mut().find(|s| s.id == id).map(|slot| {
            slot.active = active;
            slot.clone()
        }))
    }

    async fn delete_slot(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.slots.len();
        tables.slots.retain(|s| s.id != id);
        Ok(tables.slots.len() < before)
    }

    async fn find_appointment(&self, id: Uuid) -> Result<Option<DbAppointment>> {
        let tables = self.tables.lock().await;
        Ok(tables.appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn find_appointments_by_date_and_statuses(
        &self,
        date: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<DbAppointment>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<DbAppointment> = tables
            .appointments
            .iter()
            .filter(|a| {
                a.appointment_date == date && statuses.iter().any(|s| s.as_str() == a.status)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.appointment_time.cmp(&b.appointment_time));
        Ok(rows)
    }

    async fn list_appointments_for_user(&self, user_id: Uuid) -> Result<Vec<DbAppointmentDetail>> {
        let tables = self.tables.lock().await;
        tables.details_newest_first(tables.appointments.iter().filter(|a| a.user_id == user_id))
    }

    async fn list_appointments(
        &self,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<DbAppointmentDetail>> {
        let tables = self.tables.lock().await;
        tables.details_newest_first(
            tables
                .appointments
                .iter()
                .filter(|a| status.is_none_or(|s| s.as_str() == a.status)),
        )
    }

    async fn create_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<Option<DbAppointment>> {
        let mut tables = self.tables.lock().await;
        if tables.slot_held(appointment.date, &appointment.time, None) {
            return Ok(None);
        }
        let now = Utc::now();
        let row = DbAppointment {
            id: Uuid::new_v4(),
            user_id: appointment.user_id,
            service_id: appointment.service_id,
            appointment_date: appointment.date,
            appointment_time: appointment.time.clone(),
            status: AppointmentStatus::Pending.as_str().to_string(),
            notes: appointment.notes.clone(),
            justification: None,
            justified_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.appointments.push(row.clone());
        Ok(Some(row))
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Option<DbAppointment>> {
        let mut tables = self.tables.lock().await;
        let Some(index) = tables.appointments.iter().position(|a| a.id == id) else {
            return Ok(None);
        };
        let (date, time) = {
            let current = &tables.appointments[index];
            (current.appointment_date, current.appointment_time.clone())
        };
        if status.occupies_slot() && tables.slot_held(date, &time, Some(id)) {
            return Err(eyre::Report::new(SlotOccupied));
        }
        let appointment = &mut tables.appointments[index];
        appointment.status = status.as_str().to_string();
        appointment.updated_at = Utc::now();
        Ok(Some(appointment.clone()))
    }

    async fn update_appointment_justification(
        &self,
        id: Uuid,
        justification: &str,
        justified_at: DateTime<Utc>,
    ) -> Result<Option<DbAppointment>> {
        let mut tables = self.tables.lock().await;
        let appointment = tables.appointments.iter_mut().find(|a| {
            a.id == id
                && a.status == AppointmentStatus::NoShow.as_str()
                && a.justification.is_none()
        });
        Ok(appointment.map(|a| {
            a.justification = Some(justification.to_string());
            a.justified_at = Some(justified_at);
            a.updated_at = justified_at;
            a.clone()
        }))
    }

    async fn delete_appointment(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.appointments.len();
        tables.appointments.retain(|a| a.id != id);
        Ok(tables.appointments.len() < before)
    }

    async fn find_password_reset(&self, token: &str) -> Result<Option<DbPasswordReset>> {
        let tables = self.tables.lock().await;
        Ok(tables.resets.iter().find(|r| r.token == token).cloned())
    }

    async fn issue_password_reset(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<DbPasswordReset> {
        let mut tables = self.tables.lock().await;
        for reset in tables
            .resets
            .iter_mut()
            .filter(|r| r.user_id == user_id && !r.used && r.expires_at > now)
        {
            reset.used = true;
        }
        let row = DbPasswordReset {
            id: Uuid::new_v4(),
            token: token.to_string(),
            user_id,
            expires_at,
            used: false,
            created_at: now,
        };
        tables.resets.push(row.clone());
        Ok(row)
    }

    async fn consume_password_reset(
        &self,
        reset_id: Uuid,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let Some(reset) = tables
            .resets
            .iter_mut()
            .find(|r| r.id == reset_id && !r.used)
        else {
            return Ok(false);
        };
        reset.used = true;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
        }
        Ok(true)
    }
}
