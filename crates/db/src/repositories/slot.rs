use crate::models::DbAvailableSlot;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn list_slots(pool: &Pool<Postgres>) -> Result<Vec<DbAvailableSlot>> {
    let slots = sqlx::query_as::<_, DbAvailableSlot>(
        r#"
        SELECT id, day_of_week, time_slot, active, created_at
        FROM available_slots
        ORDER BY day_of_week ASC, time_slot ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(slots)
}

pub async fn get_active_slots_by_weekday(
    pool: &Pool<Postgres>,
    day_of_week: i16,
) -> Result<Vec<DbAvailableSlot>> {
    let slots = sqlx::query_as::<_, DbAvailableSlot>(
        r#"
        SELECT id, day_of_week, time_slot, active, created_at
        FROM available_slots
        WHERE day_of_week = $1 AND active
        ORDER BY time_slot ASC
        "#,
    )
    .bind(day_of_week)
    .fetch_all(pool)
    .await?;

    Ok(slots)
}

/// Returns `None` when the weekday already has this time.
pub async fn create_slot(
    pool: &Pool<Postgres>,
    day_of_week: i16,
    time_slot: &str,
) -> Result<Option<DbAvailableSlot>> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let slot = sqlx::query_as::<_, DbAvailableSlot>(
        r#"
        INSERT INTO available_slots (id, day_of_week, time_slot, active, created_at)
        VALUES ($1, $2, $3, TRUE, $4)
        ON CONFLICT (day_of_week, time_slot) DO NOTHING
        RETURNING id, day_of_week, time_slot, active, created_at
        "#,
    )
    .bind(id)
    .bind(day_of_week)
    .bind(time_slot)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}

pub async fn set_slot_active(
    pool: &Pool<Postgres>,
    id: Uuid,
    active: bool,
) -> Result<Option<DbAvailableSlot>> {
    let slot = sqlx::query_as::<_, DbAvailableSlot>(
        r#"
        UPDATE available_slots
        SET active = $2
        WHERE id = $1
        RETURNING id, day_of_week, time_slot, active, created_at
        "#,
    )
    .bind(id)
    .bind(active)
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}

pub async fn delete_slot(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM available_slots WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
