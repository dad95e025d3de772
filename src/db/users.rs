use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::models::user::{PasswordReset, User, UserOrganizer, UserProfile};

const USER_COLUMNS: &str = "id, email_address, password_hash, display_name, first_name, last_name, \
     locale, theme, is_active, activate_token, created_at, modified_at";

pub async fn find_by_email(
    executor: impl PgExecutor<'_>,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM app_user WHERE lower(email_address) = lower($1)",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(executor)
    .await
}

pub async fn find_by_id(
    executor: impl PgExecutor<'_>,
    user_id: i32,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM app_user WHERE id = $1", USER_COLUMNS))
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn insert_user(
    executor: impl PgExecutor<'_>,
    email: &str,
    password_hash: &str,
    locale: &str,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO app_user (email_address, password_hash, locale) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(email)
    .bind(password_hash)
    .bind(locale)
    .fetch_one(executor)
    .await
}

pub async fn set_activate_token(
    executor: impl PgExecutor<'_>,
    user_id: i32,
    token: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE app_user SET activate_token = $2, modified_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(token)
        .execute(executor)
        .await?;
    Ok(())
}

/// Activates the account if `token` is the one stored for it.
pub async fn activate(
    executor: impl PgExecutor<'_>,
    user_id: i32,
    token: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE app_user SET is_active = TRUE, activate_token = NULL, modified_at = NOW() \
         WHERE id = $1 AND activate_token = $2",
    )
    .bind(user_id)
    .bind(token)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn profile(
    executor: impl PgExecutor<'_>,
    user_id: i32,
) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        "SELECT id AS user_id, email_address, display_name, first_name, last_name, locale, theme \
         FROM app_user WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn linked_organizers(
    executor: impl PgExecutor<'_>,
    user_id: i32,
) -> Result<Vec<UserOrganizer>, sqlx::Error> {
    sqlx::query_as::<_, UserOrganizer>(
        "SELECT o.id AS organizer_id, o.name AS organizer_name, uol.permissions \
         FROM user_organizer_link uol \
         JOIN organizer o ON o.id = uol.organizer_id \
         WHERE uol.user_id = $1 \
         ORDER BY LOWER(o.name)",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn update_password(
    executor: impl PgExecutor<'_>,
    user_id: i32,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE app_user SET password_hash = $2, modified_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(password_hash)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn insert_password_reset(
    executor: impl PgExecutor<'_>,
    user_id: i32,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO password_reset (user_id, token, expires_at) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(executor)
        .await?;
    Ok(())
}

/// Locks the reset row for the remainder of the transaction.
pub async fn find_password_reset_for_update(
    executor: impl PgExecutor<'_>,
    token: &str,
) -> Result<Option<PasswordReset>, sqlx::Error> {
    sqlx::query_as::<_, PasswordReset>(
        "SELECT id, user_id, expires_at, used FROM password_reset WHERE token = $1 FOR UPDATE",
    )
    .bind(token)
    .fetch_optional(executor)
    .await
}

pub async fn mark_password_reset_used(
    executor: impl PgExecutor<'_>,
    reset_id: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE password_reset SET used = TRUE WHERE id = $1")
        .bind(reset_id)
        .execute(executor)
        .await?;
    Ok(())
}
