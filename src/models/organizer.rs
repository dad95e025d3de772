use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Organizer {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub legal_form: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website_link: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub address_addition: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub country_code: Option<String>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    #[serde(skip_serializing)]
    pub api_key: Uuid,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Public search result.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrganizerSummary {
    pub id: i32,
    pub name: String,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub website_link: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrganizerDashboardEntry {
    pub organizer_id: i32,
    pub organizer_name: String,
    pub permissions: i64,
    pub venue_count: i64,
    pub event_count: i64,
    pub upcoming_date_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TeamMember {
    pub member_id: i32,
    pub user_id: i32,
    pub email_address: String,
    pub display_name: Option<String>,
    pub has_joined: bool,
    pub permissions: Option<i64>,
    pub invited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MemberInvite {
    pub id: i32,
    pub organizer_id: i32,
    pub user_id: i32,
    pub has_joined: bool,
    pub pending_permissions: i64,
}
