use sqlx::PgExecutor;

use crate::models::lookup::{AccessibilityFlag, Choosable, EventTypeGenres};

/// Lookup tables exposed as choosable lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTable {
    VenueType,
    SpaceType,
    EventType,
    ReleaseStatus,
}

impl LookupTable {
    fn query(self) -> &'static str {
        match self {
            LookupTable::VenueType => "SELECT id, name FROM venue_type ORDER BY LOWER(name)",
            LookupTable::SpaceType => "SELECT id, name FROM space_type ORDER BY LOWER(name)",
            LookupTable::EventType => "SELECT id, name FROM event_type ORDER BY LOWER(name)",
            LookupTable::ReleaseStatus => "SELECT id, name FROM release_status ORDER BY id",
        }
    }
}

pub async fn choosable(
    executor: impl PgExecutor<'_>,
    table: LookupTable,
) -> Result<Vec<Choosable>, sqlx::Error> {
    sqlx::query_as::<_, Choosable>(table.query())
        .fetch_all(executor)
        .await
}

pub async fn venues_of_organizer(
    executor: impl PgExecutor<'_>,
    organizer_id: i32,
) -> Result<Vec<Choosable>, sqlx::Error> {
    sqlx::query_as::<_, Choosable>(
        "SELECT id, name FROM venue WHERE organizer_id = $1 ORDER BY LOWER(name)",
    )
    .bind(organizer_id)
    .fetch_all(executor)
    .await
}

pub async fn spaces_of_venue(
    executor: impl PgExecutor<'_>,
    venue_id: i32,
) -> Result<Vec<Choosable>, sqlx::Error> {
    sqlx::query_as::<_, Choosable>(
        "SELECT id, name FROM space WHERE venue_id = $1 ORDER BY LOWER(name)",
    )
    .bind(venue_id)
    .fetch_all(executor)
    .await
}

pub async fn genres_of_event_type(
    executor: impl PgExecutor<'_>,
    event_type_id: i32,
) -> Result<Vec<Choosable>, sqlx::Error> {
    sqlx::query_as::<_, Choosable>(
        "SELECT id, name FROM genre_type WHERE event_type_id = $1 ORDER BY LOWER(name)",
    )
    .bind(event_type_id)
    .fetch_all(executor)
    .await
}

/// Every event type with its genres nested.
pub async fn type_genre_lookup(
    executor: impl PgExecutor<'_>,
) -> Result<Vec<EventTypeGenres>, sqlx::Error> {
    sqlx::query_as::<_, EventTypeGenres>(
        r#"
        SELECT
            et.id, et.name,
            COALESCE(
                jsonb_agg(jsonb_build_object('id', gt.id, 'name', gt.name) ORDER BY LOWER(gt.name))
                    FILTER (WHERE gt.id IS NOT NULL),
                '[]'::jsonb
            ) AS genres
        FROM event_type et
        LEFT JOIN genre_type gt ON gt.event_type_id = et.id
        GROUP BY et.id, et.name
        ORDER BY LOWER(et.name)
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn accessibility_flags(
    executor: impl PgExecutor<'_>,
) -> Result<Vec<AccessibilityFlag>, sqlx::Error> {
    sqlx::query_as::<_, AccessibilityFlag>(
        "SELECT flag, topic_id, name FROM accessibility_flag ORDER BY topic_id, flag",
    )
    .fetch_all(executor)
    .await
}

pub async fn release_status_exists(
    executor: impl PgExecutor<'_>,
    release_status_id: i32,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM release_status WHERE id = $1)")
        .bind(release_status_id)
        .fetch_one(executor)
        .await
}
