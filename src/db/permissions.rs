//! Ownership lookups used for permission checks.

use sqlx::PgExecutor;

use crate::models::Permission;

/// The user's mask on an organizer, `None` without a link.
pub async fn organizer_permission(
    executor: impl PgExecutor<'_>,
    user_id: i32,
    organizer_id: i32,
) -> Result<Option<Permission>, sqlx::Error> {
    let mask: Option<i64> = sqlx::query_scalar(
        "SELECT permissions FROM user_organizer_link WHERE user_id = $1 AND organizer_id = $2",
    )
    .bind(user_id)
    .bind(organizer_id)
    .fetch_optional(executor)
    .await?;
    Ok(mask.map(Permission::from_db))
}

pub async fn venue_organizer(
    executor: impl PgExecutor<'_>,
    venue_id: i32,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar("SELECT organizer_id FROM venue WHERE id = $1")
        .bind(venue_id)
        .fetch_optional(executor)
        .await
}

/// `(venue_id, organizer_id)` of a space.
pub async fn space_owner(
    executor: impl PgExecutor<'_>,
    space_id: i32,
) -> Result<Option<(i32, i32)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT s.venue_id, v.organizer_id FROM space s JOIN venue v ON v.id = s.venue_id WHERE s.id = $1",
    )
    .bind(space_id)
    .fetch_optional(executor)
    .await
}

pub async fn event_organizer(
    executor: impl PgExecutor<'_>,
    event_id: i32,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar("SELECT organizer_id FROM event WHERE id = $1")
        .bind(event_id)
        .fetch_optional(executor)
        .await
}

pub async fn is_space_in_venue(
    executor: impl PgExecutor<'_>,
    space_id: i32,
    venue_id: i32,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM space WHERE id = $1 AND venue_id = $2)")
        .bind(space_id)
        .bind(venue_id)
        .fetch_one(executor)
        .await
}
