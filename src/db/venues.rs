use sqlx::PgExecutor;

use crate::models::venue::{Venue, VenueListItem};
use crate::sql::QueryFilter;

#[derive(Debug, Default)]
pub struct NewVenue {
    pub organizer_id: i32,
    pub venue_type_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website_link: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub country_code: Option<String>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
}

const VENUE_COLUMNS: &str = "id, organizer_id, venue_type_id, name, description, contact_email, \
     contact_phone, website_link, street, house_number, postal_code, city, state_code, country_code, \
     ST_X(wkb_pos) AS lon, ST_Y(wkb_pos) AS lat";

pub async fn insert(
    executor: impl PgExecutor<'_>,
    venue: &NewVenue,
    created_by: i32,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO venue (
            organizer_id, venue_type_id, name, description, contact_email, contact_phone,
            website_link, street, house_number, postal_code, city, state_code, country_code,
            wkb_pos, created_by
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
            CASE WHEN $14::float8 IS NULL OR $15::float8 IS NULL THEN NULL
                 ELSE ST_SetSRID(ST_MakePoint($14, $15), 4326) END,
            $16
        )
        RETURNING id
        "#,
    )
    .bind(venue.organizer_id)
    .bind(venue.venue_type_id)
    .bind(&venue.name)
    .bind(&venue.description)
    .bind(&venue.contact_email)
    .bind(&venue.contact_phone)
    .bind(&venue.website_link)
    .bind(&venue.street)
    .bind(&venue.house_number)
    .bind(&venue.postal_code)
    .bind(&venue.city)
    .bind(&venue.state_code)
    .bind(&venue.country_code)
    .bind(venue.lon)
    .bind(venue.lat)
    .bind(created_by)
    .fetch_one(executor)
    .await
}

pub async fn get(executor: impl PgExecutor<'_>, venue_id: i32) -> Result<Option<Venue>, sqlx::Error> {
    sqlx::query_as::<_, Venue>(&format!("SELECT {} FROM venue WHERE id = $1", VENUE_COLUMNS))
        .bind(venue_id)
        .fetch_optional(executor)
        .await
}

pub async fn delete(executor: impl PgExecutor<'_>, venue_id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM venue WHERE id = $1")
        .bind(venue_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_by_organizer(
    executor: impl PgExecutor<'_>,
    organizer_id: i32,
) -> Result<Vec<Venue>, sqlx::Error> {
    sqlx::query_as::<_, Venue>(&format!(
        "SELECT {} FROM venue WHERE organizer_id = $1 ORDER BY LOWER(name)",
        VENUE_COLUMNS
    ))
    .bind(organizer_id)
    .fetch_all(executor)
    .await
}

/// Public venue listing; `pagination` is the clause returned by
/// `QueryFilter::limit_offset`.
pub async fn list_public(
    executor: impl PgExecutor<'_>,
    filter: QueryFilter,
    pagination: &str,
) -> Result<Vec<VenueListItem>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT
            v.id, v.name, v.organizer_id, o.name AS organizer_name, vt.name AS venue_type,
            v.street, v.house_number, v.postal_code, v.city, v.country_code,
            ST_X(v.wkb_pos) AS lon, ST_Y(v.wkb_pos) AS lat
        FROM venue v
        JOIN organizer o ON o.id = v.organizer_id
        LEFT JOIN venue_type vt ON vt.id = v.venue_type_id
        {}
        ORDER BY LOWER(v.name), v.id
        {}
        "#,
        filter.where_clause(),
        pagination
    );
    sqlx::query_as_with::<_, VenueListItem, _>(&sql, filter.into_arguments())
        .fetch_all(executor)
        .await
}
