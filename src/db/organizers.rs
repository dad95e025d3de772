use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::organizer::{
    MemberInvite, Organizer, OrganizerDashboardEntry, OrganizerSummary, TeamMember,
};
use crate::models::Permission;

pub async fn insert(
    executor: impl PgExecutor<'_>,
    name: &str,
    api_key: Uuid,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar("INSERT INTO organizer (name, api_key) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(api_key)
        .fetch_one(executor)
        .await
}

/// Creates or replaces the user's permission link.
pub async fn upsert_user_link(
    executor: impl PgExecutor<'_>,
    user_id: i32,
    organizer_id: i32,
    permissions: Permission,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_organizer_link (user_id, organizer_id, permissions) VALUES ($1, $2, $3) \
         ON CONFLICT (user_id, organizer_id) DO UPDATE SET permissions = EXCLUDED.permissions",
    )
    .bind(user_id)
    .bind(organizer_id)
    .bind(permissions.to_db())
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_joined_member(
    executor: impl PgExecutor<'_>,
    organizer_id: i32,
    user_id: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO organizer_member_link (organizer_id, user_id, has_joined) VALUES ($1, $2, TRUE)",
    )
    .bind(organizer_id)
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get(
    executor: impl PgExecutor<'_>,
    organizer_id: i32,
) -> Result<Option<Organizer>, sqlx::Error> {
    sqlx::query_as::<_, Organizer>(
        "SELECT id, name, description, legal_form, contact_email, contact_phone, website_link, \
         street, house_number, address_addition, postal_code, city, state_code, country_code, \
         ST_X(wkb_pos) AS lon, ST_Y(wkb_pos) AS lat, api_key, created_at, modified_at \
         FROM organizer WHERE id = $1",
    )
    .bind(organizer_id)
    .fetch_optional(executor)
    .await
}

pub async fn delete(executor: impl PgExecutor<'_>, organizer_id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM organizer WHERE id = $1")
        .bind(organizer_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn dashboard(
    executor: impl PgExecutor<'_>,
    user_id: i32,
) -> Result<Vec<OrganizerDashboardEntry>, sqlx::Error> {
    sqlx::query_as::<_, OrganizerDashboardEntry>(
        r#"
        SELECT
            o.id AS organizer_id,
            o.name AS organizer_name,
            uol.permissions,
            (SELECT COUNT(*) FROM venue v WHERE v.organizer_id = o.id) AS venue_count,
            (SELECT COUNT(*) FROM event e WHERE e.organizer_id = o.id) AS event_count,
            (SELECT COUNT(*) FROM event_date ed JOIN event e ON e.id = ed.event_id
             WHERE e.organizer_id = o.id AND ed.start_at >= NOW()) AS upcoming_date_count
        FROM user_organizer_link uol
        JOIN organizer o ON o.id = uol.organizer_id
        WHERE uol.user_id = $1
        ORDER BY LOWER(o.name)
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

const SUMMARY_COLUMNS: &str = "id, name, city, country_code, website_link, contact_email";

/// An `@` in the search term matches the contact email, anything else the name.
pub async fn search_public(
    executor: impl PgExecutor<'_>,
    search: &str,
) -> Result<Vec<OrganizerSummary>, sqlx::Error> {
    let column = if search.contains('@') {
        "contact_email"
    } else {
        "name"
    };
    sqlx::query_as::<_, OrganizerSummary>(&format!(
        "SELECT {} FROM organizer WHERE {} ILIKE '%' || $1 || '%' ORDER BY LOWER(name) LIMIT 100",
        SUMMARY_COLUMNS, column
    ))
    .bind(search)
    .fetch_all(executor)
    .await
}

pub async fn get_public(
    executor: impl PgExecutor<'_>,
    organizer_id: i32,
) -> Result<Option<OrganizerSummary>, sqlx::Error> {
    sqlx::query_as::<_, OrganizerSummary>(&format!(
        "SELECT {} FROM organizer WHERE id = $1",
        SUMMARY_COLUMNS
    ))
    .bind(organizer_id)
    .fetch_optional(executor)
    .await
}

pub async fn team(
    executor: impl PgExecutor<'_>,
    organizer_id: i32,
) -> Result<Vec<TeamMember>, sqlx::Error> {
    sqlx::query_as::<_, TeamMember>(
        "SELECT m.id AS member_id, u.id AS user_id, u.email_address, u.display_name, m.has_joined, \
         uol.permissions, m.invited_at \
         FROM organizer_member_link m \
         JOIN app_user u ON u.id = m.user_id \
         LEFT JOIN user_organizer_link uol ON uol.user_id = m.user_id AND uol.organizer_id = m.organizer_id \
         WHERE m.organizer_id = $1 \
         ORDER BY m.has_joined DESC, LOWER(u.email_address)",
    )
    .bind(organizer_id)
    .fetch_all(executor)
    .await
}

pub async fn is_member(
    executor: impl PgExecutor<'_>,
    organizer_id: i32,
    user_id: i32,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM organizer_member_link WHERE organizer_id = $1 AND user_id = $2)",
    )
    .bind(organizer_id)
    .bind(user_id)
    .fetch_one(executor)
    .await
}

pub async fn insert_invite(
    executor: impl PgExecutor<'_>,
    organizer_id: i32,
    user_id: i32,
    invited_by: i32,
    token: &str,
    pending_permissions: Permission,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO organizer_member_link \
         (organizer_id, user_id, has_joined, pending_permissions, invite_token, invited_by_user_id, invited_at) \
         VALUES ($1, $2, FALSE, $3, $4, $5, NOW()) RETURNING id",
    )
    .bind(organizer_id)
    .bind(user_id)
    .bind(pending_permissions.to_db())
    .bind(token)
    .bind(invited_by)
    .fetch_one(executor)
    .await
}

pub async fn find_invite_for_update(
    executor: impl PgExecutor<'_>,
    token: &str,
) -> Result<Option<MemberInvite>, sqlx::Error> {
    sqlx::query_as::<_, MemberInvite>(
        "SELECT id, organizer_id, user_id, has_joined, pending_permissions \
         FROM organizer_member_link WHERE invite_token = $1 FOR UPDATE",
    )
    .bind(token)
    .fetch_optional(executor)
    .await
}

pub async fn mark_joined(executor: impl PgExecutor<'_>, member_id: i32) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE organizer_member_link \
         SET has_joined = TRUE, invite_token = NULL, pending_permissions = 0, modified_at = NOW() \
         WHERE id = $1",
    )
    .bind(member_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn member(
    executor: impl PgExecutor<'_>,
    organizer_id: i32,
    member_id: i32,
) -> Result<Option<MemberInvite>, sqlx::Error> {
    sqlx::query_as::<_, MemberInvite>(
        "SELECT id, organizer_id, user_id, has_joined, pending_permissions \
         FROM organizer_member_link WHERE organizer_id = $1 AND id = $2",
    )
    .bind(organizer_id)
    .bind(member_id)
    .fetch_optional(executor)
    .await
}

pub async fn delete_member(executor: impl PgExecutor<'_>, member_id: i32) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM organizer_member_link WHERE id = $1")
        .bind(member_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn delete_user_link(
    executor: impl PgExecutor<'_>,
    user_id: i32,
    organizer_id: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM user_organizer_link WHERE user_id = $1 AND organizer_id = $2")
        .bind(user_id)
        .bind(organizer_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Sets or clears one bit in a single statement and returns the new mask,
/// `None` if the user has no link to the organizer.
pub async fn update_permission_bit(
    executor: impl PgExecutor<'_>,
    user_id: i32,
    organizer_id: i32,
    bit: i32,
    enabled: bool,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "UPDATE user_organizer_link \
         SET permissions = CASE WHEN $1 THEN permissions | (1::bigint << $2) \
                                ELSE permissions & ~(1::bigint << $2) END \
         WHERE user_id = $3 AND organizer_id = $4 \
         RETURNING permissions",
    )
    .bind(enabled)
    .bind(bit)
    .bind(user_id)
    .bind(organizer_id)
    .fetch_optional(executor)
    .await
}
