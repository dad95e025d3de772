use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgExecutor};

use crate::models::event::{
    Event, EventDate, EventDateDetail, EventListItem, EventTypePair, OrganizerEvent,
    PUBLIC_RELEASE_STATES,
};
use crate::sql::QueryFilter;

#[derive(Debug, Default)]
pub struct NewEvent {
    pub organizer_id: i32,
    pub venue_id: Option<i32>,
    pub space_id: Option<i32>,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub teaser_text: Option<String>,
    pub participation_info: Option<String>,
    pub meeting_point: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub max_attendees: Option<i32>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub currency_code: Option<String>,
    pub ticket_required: bool,
    pub registration_required: bool,
    pub online_event_url: Option<String>,
    pub source_url: Option<String>,
    pub languages: Vec<String>,
    pub tags: Vec<String>,
    pub types: Vec<EventTypePair>,
}

#[derive(Debug, Clone)]
pub struct NewEventDate {
    pub venue_id: Option<i32>,
    pub space_id: Option<i32>,
    pub start_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
    pub entry_time: Option<NaiveTime>,
    pub all_day: bool,
    pub accessibility_flags: i64,
    pub visitor_info_flags: i64,
    pub accessibility_info: Option<String>,
    pub ticket_link: Option<String>,
    pub custom: Option<String>,
}

pub async fn insert(
    executor: impl PgExecutor<'_>,
    event: &NewEvent,
    created_by: i32,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO event (
            organizer_id, venue_id, space_id, title, subtitle, description, teaser_text,
            participation_info, meeting_point, min_age, max_age, max_attendees, min_price,
            max_price, currency_code, ticket_required, registration_required, online_event_url,
            source_url, languages, tags, types, created_by
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
            $19, $20, $21, $22, $23
        )
        RETURNING id
        "#,
    )
    .bind(event.organizer_id)
    .bind(event.venue_id)
    .bind(event.space_id)
    .bind(&event.title)
    .bind(&event.subtitle)
    .bind(&event.description)
    .bind(&event.teaser_text)
    .bind(&event.participation_info)
    .bind(&event.meeting_point)
    .bind(event.min_age)
    .bind(event.max_age)
    .bind(event.max_attendees)
    .bind(event.min_price)
    .bind(event.max_price)
    .bind(&event.currency_code)
    .bind(event.ticket_required)
    .bind(event.registration_required)
    .bind(&event.online_event_url)
    .bind(&event.source_url)
    .bind(&event.languages)
    .bind(&event.tags)
    .bind(Json(&event.types))
    .bind(created_by)
    .fetch_one(executor)
    .await
}

pub async fn insert_date(
    executor: impl PgExecutor<'_>,
    event_id: i32,
    date: &NewEventDate,
    created_by: i32,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO event_date (
            event_id, venue_id, space_id, start_date, start_time, end_date, end_time,
            entry_time, all_day, accessibility_flags, visitor_info_flags, accessibility_info,
            ticket_link, custom, created_by
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING id
        "#,
    )
    .bind(event_id)
    .bind(date.venue_id)
    .bind(date.space_id)
    .bind(date.start_date)
    .bind(date.start_time)
    .bind(date.end_date)
    .bind(date.end_time)
    .bind(date.entry_time)
    .bind(date.all_day)
    .bind(date.accessibility_flags)
    .bind(date.visitor_info_flags)
    .bind(&date.accessibility_info)
    .bind(&date.ticket_link)
    .bind(&date.custom)
    .bind(created_by)
    .fetch_one(executor)
    .await
}

/// Replaces every field of a date belonging to `event_id`.
pub async fn update_date(
    executor: impl PgExecutor<'_>,
    event_id: i32,
    date_id: i32,
    date: &NewEventDate,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE event_date SET
            venue_id = $3, space_id = $4, start_date = $5, start_time = $6, end_date = $7,
            end_time = $8, entry_time = $9, all_day = $10, accessibility_flags = $11,
            visitor_info_flags = $12, accessibility_info = $13, ticket_link = $14, custom = $15,
            modified_at = NOW()
        WHERE event_id = $1 AND id = $2
        "#,
    )
    .bind(event_id)
    .bind(date_id)
    .bind(date.venue_id)
    .bind(date.space_id)
    .bind(date.start_date)
    .bind(date.start_time)
    .bind(date.end_date)
    .bind(date.end_time)
    .bind(date.entry_time)
    .bind(date.all_day)
    .bind(date.accessibility_flags)
    .bind(date.visitor_info_flags)
    .bind(&date.accessibility_info)
    .bind(&date.ticket_link)
    .bind(&date.custom)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_date(
    executor: impl PgExecutor<'_>,
    event_id: i32,
    date_id: i32,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM event_date WHERE event_id = $1 AND id = $2")
        .bind(event_id)
        .bind(date_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Locks the event row so concurrent date changes serialize.
pub async fn lock(executor: impl PgExecutor<'_>, event_id: i32) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT id FROM event WHERE id = $1 FOR UPDATE")
        .bind(event_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn date_count(executor: impl PgExecutor<'_>, event_id: i32) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM event_date WHERE event_id = $1")
        .bind(event_id)
        .fetch_one(executor)
        .await
}

pub async fn get(executor: impl PgExecutor<'_>, event_id: i32) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        r#"
        SELECT
            e.id, e.organizer_id, o.name AS organizer_name, e.venue_id, e.space_id, e.title,
            e.subtitle, e.description, e.teaser_text, e.participation_info, e.meeting_point,
            e.min_age, e.max_age, e.max_attendees, e.min_price, e.max_price,
            TRIM(e.currency_code) AS currency_code, e.ticket_required, e.registration_required,
            e.online_event_url, e.source_url, e.languages, e.tags, e.types,
            e.release_status_id, e.release_date, e.created_at, e.modified_at
        FROM event e
        JOIN organizer o ON o.id = e.organizer_id
        WHERE e.id = $1
        "#,
    )
    .bind(event_id)
    .fetch_optional(executor)
    .await
}

pub async fn dates(
    executor: impl PgExecutor<'_>,
    event_id: i32,
) -> Result<Vec<EventDate>, sqlx::Error> {
    sqlx::query_as::<_, EventDate>(
        "SELECT id, event_id, venue_id, space_id, start_date, start_time, end_date, end_time, \
         entry_time, all_day, accessibility_flags, visitor_info_flags, accessibility_info, \
         ticket_link, custom \
         FROM event_date WHERE event_id = $1 ORDER BY start_at, id",
    )
    .bind(event_id)
    .fetch_all(executor)
    .await
}

pub async fn delete(executor: impl PgExecutor<'_>, event_id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM event WHERE id = $1")
        .bind(event_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_release_status(
    executor: impl PgExecutor<'_>,
    event_id: i32,
    release_status_id: i32,
    release_date: Option<NaiveDate>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE event SET release_status_id = $2, release_date = $3, modified_at = NOW() WHERE id = $1",
    )
    .bind(event_id)
    .bind(release_status_id)
    .bind(release_date)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_by_organizer(
    executor: impl PgExecutor<'_>,
    organizer_id: i32,
) -> Result<Vec<OrganizerEvent>, sqlx::Error> {
    sqlx::query_as::<_, OrganizerEvent>(
        r#"
        SELECT
            e.id, e.title, e.release_status_id, v.name AS venue_name,
            COUNT(ed.id) AS date_count,
            MIN(ed.start_date) FILTER (WHERE ed.start_at >= NOW()) AS next_date
        FROM event e
        LEFT JOIN venue v ON v.id = e.venue_id
        LEFT JOIN event_date ed ON ed.event_id = e.id
        WHERE e.organizer_id = $1
        GROUP BY e.id, v.name
        ORDER BY next_date NULLS LAST, e.id
        "#,
    )
    .bind(organizer_id)
    .fetch_all(executor)
    .await
}

/// Ids from `type_ids` that have no `event_type` row.
pub async fn unknown_event_types(
    executor: impl PgExecutor<'_>,
    type_ids: &[i32],
) -> Result<Vec<i32>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT t.id FROM UNNEST($1::int[]) AS t(id) \
         WHERE NOT EXISTS (SELECT 1 FROM event_type et WHERE et.id = t.id)",
    )
    .bind(type_ids)
    .fetch_all(executor)
    .await
}

/// `(type_id, genre_id)` pairs whose genre does not exist under that type.
pub async fn mismatched_genres(
    executor: impl PgExecutor<'_>,
    type_ids: &[i32],
    genre_ids: &[i32],
) -> Result<Vec<(i32, i32)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT p.type_id, p.genre_id FROM UNNEST($1::int[], $2::int[]) AS p(type_id, genre_id) \
         WHERE NOT EXISTS (SELECT 1 FROM genre_type gt \
                           WHERE gt.id = p.genre_id AND gt.event_type_id = p.type_id)",
    )
    .bind(type_ids)
    .bind(genre_ids)
    .fetch_all(executor)
    .await
}

const LIST_SELECT: &str = r#"
    SELECT
        ed.id AS event_date_id, e.id AS event_id, e.title, e.subtitle, e.teaser_text,
        ed.start_date, ed.start_time, ed.end_date, ed.end_time, ed.all_day,
        e.release_status_id, e.organizer_id, o.name AS organizer_name,
        v.id AS venue_id, v.name AS venue_name, v.city AS venue_city,
        v.postal_code AS venue_postal_code, v.country_code AS venue_country_code,
        ST_X(v.wkb_pos) AS venue_lon, ST_Y(v.wkb_pos) AS venue_lat,
        s.id AS space_id, s.name AS space_name, e.min_age, e.max_age, e.tags,
        ed.accessibility_flags, ed.visitor_info_flags,
        COALESCE((
            SELECT jsonb_agg(jsonb_build_object(
                'type_id', et.id, 'type_name', et.name,
                'genre_id', gt.id, 'genre_name', gt.name) ORDER BY t.ord)
            FROM jsonb_array_elements(e.types) WITH ORDINALITY AS t(elem, ord)
            JOIN event_type et ON et.id = (t.elem->>0)::int
            LEFT JOIN genre_type gt ON gt.id = (t.elem->>1)::int
        ), '[]'::jsonb) AS event_types"#;

const LIST_FROM: &str = r#"
    FROM event_date ed
    JOIN event e ON e.id = ed.event_id
    JOIN organizer o ON o.id = e.organizer_id
    LEFT JOIN venue v ON v.id = COALESCE(ed.venue_id, e.venue_id)
    LEFT JOIN space s ON s.id = COALESCE(ed.space_id, e.space_id)"#;

#[derive(FromRow)]
struct CountedListItem {
    #[sqlx(flatten)]
    item: EventListItem,
    total: i64,
}

/// Restricts a filter to publicly visible events.
pub fn public_only(filter: &mut QueryFilter) {
    filter.push(
        "e.release_status_id = ANY({})",
        PUBLIC_RELEASE_STATES.to_vec(),
    );
}

/// Listed dates plus the total number of matches ignoring pagination.
pub async fn list_public(
    executor: impl PgExecutor<'_>,
    filter: QueryFilter,
    pagination: &str,
) -> Result<(Vec<EventListItem>, i64), sqlx::Error> {
    let sql = format!(
        "{}, COUNT(*) OVER() AS total {} {} ORDER BY ed.start_at, e.id, ed.id {}",
        LIST_SELECT,
        LIST_FROM,
        filter.where_clause(),
        pagination
    );
    let rows = sqlx::query_as_with::<_, CountedListItem, _>(&sql, filter.into_arguments())
        .fetch_all(executor)
        .await?;

    let total = rows.first().map(|r| r.total).unwrap_or(0);
    Ok((rows.into_iter().map(|r| r.item).collect(), total))
}

pub async fn public_date_detail(
    executor: impl PgExecutor<'_>,
    event_id: i32,
    date_id: i32,
) -> Result<Option<EventDateDetail>, sqlx::Error> {
    let sql = format!(
        r#"{},
            e.description, e.participation_info, e.meeting_point, e.languages,
            e.min_price, e.max_price, TRIM(e.currency_code) AS currency_code,
            e.ticket_required, e.registration_required, e.online_event_url,
            ed.entry_time, ed.accessibility_info, ed.ticket_link,
            v.street AS venue_street, v.house_number AS venue_house_number
        {}
        WHERE e.id = $1 AND ed.id = $2 AND e.release_status_id = ANY($3)"#,
        LIST_SELECT, LIST_FROM
    );
    sqlx::query_as::<_, EventDateDetail>(&sql)
        .bind(event_id)
        .bind(date_id)
        .bind(PUBLIC_RELEASE_STATES.to_vec())
        .fetch_optional(executor)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_only_binds_release_states() {
        let mut filter = QueryFilter::new();
        public_only(&mut filter);
        assert_eq!(
            filter.where_clause(),
            "WHERE e.release_status_id = ANY($1)"
        );
    }
}
