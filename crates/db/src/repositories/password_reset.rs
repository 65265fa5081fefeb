use crate::models::DbPasswordReset;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_password_reset_by_token(
    pool: &Pool<Postgres>,
    token: &str,
) -> Result<Option<DbPasswordReset>> {
    let reset = sqlx::query_as::<_, DbPasswordReset>(
        r#"
        SELECT id, token, user_id, expires_at, used, created_at
        FROM password_resets
        WHERE token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(reset)
}

/// Invalidates the user's active tokens and stores a new one, atomically.
pub async fn issue_password_reset(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    token: &str,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<DbPasswordReset> {
    let mut tx = pool.begin().await?;

    let invalidated = sqlx::query(
        r#"
        UPDATE password_resets
        SET used = TRUE
        WHERE user_id = $1 AND NOT used AND expires_at > $2
        "#,
    )
    .bind(user_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let reset = sqlx::query_as::<_, DbPasswordReset>(
        r#"
        INSERT INTO password_resets (id, token, user_id, expires_at, used, created_at)
        VALUES ($1, $2, $3, $4, FALSE, $5)
        RETURNING id, token, user_id, expires_at, used, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(token)
    .bind(user_id)
    .bind(expires_at)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(
        "Issued password reset for user {} ({} previous tokens invalidated)",
        user_id,
        invalidated.rows_affected()
    );
    Ok(reset)
}

/// Marks the token used and stores the new password hash in one transaction.
///
/// Returns `false` without touching the password when the token was already
/// consumed.
pub async fn consume_password_reset(
    pool: &Pool<Postgres>,
    reset_id: Uuid,
    user_id: Uuid,
    password_hash: &str,
) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let claimed = sqlx::query("UPDATE password_resets SET used = TRUE WHERE id = $1 AND NOT used")
        .bind(reset_id)
        .execute(&mut *tx)
        .await?;

    if claimed.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}
