use crate::models::{DbService, NewService, ServiceChanges};
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn list_services(pool: &Pool<Postgres>, active_only: bool) -> Result<Vec<DbService>> {
    let services = sqlx::query_as::<_, DbService>(
        r#"
        SELECT id, name, description, price, duration_minutes, active, created_at
        FROM services
        WHERE active OR NOT $1
        ORDER BY price ASC, name ASC
        "#,
    )
    .bind(active_only)
    .fetch_all(pool)
    .await?;

    Ok(services)
}

pub async fn get_service_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbService>> {
    let service = sqlx::query_as::<_, DbService>(
        r#"
        SELECT id, name, description, price, duration_minutes, active, created_at
        FROM services
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(service)
}

pub async fn create_service(pool: &Pool<Postgres>, service: &NewService) -> Result<DbService> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let created = sqlx::query_as::<_, DbService>(
        r#"
        INSERT INTO services (id, name, description, price, duration_minutes, active, created_at)
        VALUES ($1, $2, $3, $4, $5, TRUE, $6)
        RETURNING id, name, description, price, duration_minutes, active, created_at
        "#,
    )
    .bind(id)
    .bind(&service.name)
    .bind(&service.description)
    .bind(service.price)
    .bind(service.duration_minutes)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

pub async fn update_service(
    pool: &Pool<Postgres>,
    id: Uuid,
    changes: &ServiceChanges,
) -> Result<Option<DbService>> {
    let updated = sqlx::query_as::<_, DbService>(
        r#"
        UPDATE services
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            price = COALESCE($4, price),
            duration_minutes = COALESCE($5, duration_minutes),
            active = COALESCE($6, active)
        WHERE id = $1
        RETURNING id, name, description, price, duration_minutes, active, created_at
        "#,
    )
    .bind(id)
    .bind(&changes.name)
    .bind(&changes.description)
    .bind(changes.price)
    .bind(changes.duration_minutes)
    .bind(changes.active)
    .fetch_optional(pool)
    .await?;

    Ok(updated)
}
