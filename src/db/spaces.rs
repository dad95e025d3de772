use sqlx::PgExecutor;

use crate::models::space::Space;

#[derive(Debug, Default)]
pub struct NewSpace {
    pub venue_id: i32,
    pub space_type_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub total_capacity: Option<i32>,
    pub seating_capacity: Option<i32>,
    pub building_level: Option<i32>,
    pub website_link: Option<String>,
}

pub async fn insert(
    executor: impl PgExecutor<'_>,
    space: &NewSpace,
    created_by: i32,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO space (venue_id, space_type_id, name, description, total_capacity, \
         seating_capacity, building_level, website_link, created_by) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
    )
    .bind(space.venue_id)
    .bind(space.space_type_id)
    .bind(&space.name)
    .bind(&space.description)
    .bind(space.total_capacity)
    .bind(space.seating_capacity)
    .bind(space.building_level)
    .bind(&space.website_link)
    .bind(created_by)
    .fetch_one(executor)
    .await
}

pub async fn get(executor: impl PgExecutor<'_>, space_id: i32) -> Result<Option<Space>, sqlx::Error> {
    sqlx::query_as::<_, Space>(
        "SELECT s.id, s.venue_id, v.organizer_id, s.space_type_id, s.name, s.description, \
         s.total_capacity, s.seating_capacity, s.building_level, s.website_link \
         FROM space s JOIN venue v ON v.id = s.venue_id WHERE s.id = $1",
    )
    .bind(space_id)
    .fetch_optional(executor)
    .await
}

pub async fn delete(executor: impl PgExecutor<'_>, space_id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM space WHERE id = $1")
        .bind(space_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
