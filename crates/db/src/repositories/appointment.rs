use crate::{
    models::{DbAppointment, DbAppointmentDetail, NewAppointment},
    repositories::{SlotOccupied, is_unique_violation},
};
use chrono::{DateTime, NaiveDate, Utc};
use eyre::Result;
use salon_core::models::appointment::AppointmentStatus;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const APPOINTMENT_COLUMNS: &str = "id, user_id, service_id, appointment_date, appointment_time, \
     status, notes, justification, justified_at, created_at, updated_at";

const DETAIL_SELECT: &str = r#"
    SELECT a.id, a.user_id, a.service_id, a.appointment_date, a.appointment_time,
           a.status, a.notes, a.justification, a.justified_at, a.created_at, a.updated_at,
           s.name AS service_name, s.price AS service_price,
           s.duration_minutes AS service_duration,
           u.name AS user_name, u.email AS user_email, u.phone AS user_phone
    FROM appointments a
    JOIN services s ON s.id = a.service_id
    JOIN users u ON u.id = a.user_id
"#;

fn status_strings(statuses: &[AppointmentStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

pub async fn get_appointment_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn get_appointments_by_date_and_statuses(
    pool: &Pool<Postgres>,
    date: NaiveDate,
    statuses: &[AppointmentStatus],
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE appointment_date = $1 AND status = ANY($2)
        ORDER BY appointment_time ASC
        "#
    ))
    .bind(date)
    .bind(status_strings(statuses))
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn list_appointments_for_user(
    pool: &Pool<Postgres>,
    user_id: Uuid,
) -> Result<Vec<DbAppointmentDetail>> {
    let appointments = sqlx::query_as::<_, DbAppointmentDetail>(&format!(
        "{DETAIL_SELECT} WHERE a.user_id = $1 ORDER BY a.appointment_date DESC, a.appointment_time DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn list_appointments(
    pool: &Pool<Postgres>,
    status: Option<AppointmentStatus>,
) -> Result<Vec<DbAppointmentDetail>> {
    let appointments = sqlx::query_as::<_, DbAppointmentDetail>(&format!(
        "{DETAIL_SELECT} WHERE ($1::VARCHAR IS NULL OR a.status = $1) \
         ORDER BY a.appointment_date DESC, a.appointment_time DESC"
    ))
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Inserts a PENDING appointment.
///
/// Returns `None` when a pending or confirmed appointment already holds the
/// same (date, time); the partial unique index makes this hold even for
/// concurrent inserts.
pub async fn create_appointment(
    pool: &Pool<Postgres>,
    appointment: &NewAppointment,
) -> Result<Option<DbAppointment>> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating appointment: id={}, date={}, time={}",
        id,
        appointment.date,
        appointment.time
    );

    let created = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments
            (id, user_id, service_id, appointment_date, appointment_time, status, notes, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
        ON CONFLICT DO NOTHING
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(appointment.user_id)
    .bind(appointment.service_id)
    .bind(appointment.date)
    .bind(&appointment.time)
    .bind(AppointmentStatus::Pending.as_str())
    .bind(&appointment.notes)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(created)
}

/// Overwrites the status. Fails with [`SlotOccupied`] when reactivating an
/// appointment whose slot was taken in the meantime.
pub async fn update_appointment_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: AppointmentStatus,
) -> Result<Option<DbAppointment>> {
    let updated = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET status = $2, updated_at = $3
        WHERE id = $1
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status.as_str())
    .bind(Utc::now())
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            eyre::Report::new(SlotOccupied)
        } else {
            e.into()
        }
    })?;

    Ok(updated)
}

/// Records a justification once, and only on a NO_SHOW appointment.
///
/// Returns `None` when the appointment is missing, not NO_SHOW, or already
/// justified.
pub async fn update_appointment_justification(
    pool: &Pool<Postgres>,
    id: Uuid,
    justification: &str,
    justified_at: DateTime<Utc>,
) -> Result<Option<DbAppointment>> {
    let updated = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET justification = $2, justified_at = $3, updated_at = $3
        WHERE id = $1 AND status = 'NO_SHOW' AND justification IS NULL
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(justification)
    .bind(justified_at)
    .fetch_optional(pool)
    .await?;

    Ok(updated)
}

pub async fn delete_appointment(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
