use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Space {
    pub id: i32,
    pub venue_id: i32,
    pub organizer_id: i32,
    pub space_type_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub total_capacity: Option<i32>,
    pub seating_capacity: Option<i32>,
    pub building_level: Option<i32>,
    pub website_link: Option<String>,
}
