use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

pub const RELEASE_STATUS_DRAFT: i32 = 1;
pub const RELEASE_STATUS_REVIEW: i32 = 2;
pub const RELEASE_STATUS_RELEASED: i32 = 3;
pub const RELEASE_STATUS_CANCELLED: i32 = 4;

/// Release states visible on the public API.
pub const PUBLIC_RELEASE_STATES: [i32; 2] = [RELEASE_STATUS_RELEASED, RELEASE_STATUS_CANCELLED];

/// `[type_id, genre_id]` as stored in `event.types`.
pub type EventTypePair = (i32, Option<i32>);

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: i32,
    pub organizer_id: i32,
    pub organizer_name: String,
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
    pub types: Json<Vec<EventTypePair>>,
    pub release_status_id: i32,
    pub release_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub dates: Vec<EventDate>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventDate {
    pub id: i32,
    pub event_id: i32,
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

/// Admin listing row of an organizer's events.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrganizerEvent {
    pub id: i32,
    pub title: String,
    pub release_status_id: i32,
    pub venue_name: Option<String>,
    pub date_count: i64,
    pub next_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTypeRef {
    pub type_id: i32,
    pub type_name: String,
    pub genre_id: Option<i32>,
    pub genre_name: Option<String>,
}

/// One row of the public event listing: an event date joined with its event.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventListItem {
    pub event_date_id: i32,
    pub event_id: i32,
    pub title: String,
    pub subtitle: Option<String>,
    pub teaser_text: Option<String>,
    pub start_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
    pub all_day: bool,
    pub release_status_id: i32,
    pub organizer_id: i32,
    pub organizer_name: String,
    pub venue_id: Option<i32>,
    pub venue_name: Option<String>,
    pub venue_city: Option<String>,
    pub venue_postal_code: Option<String>,
    pub venue_country_code: Option<String>,
    pub venue_lon: Option<f64>,
    pub venue_lat: Option<f64>,
    pub space_id: Option<i32>,
    pub space_name: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub tags: Vec<String>,
    pub accessibility_flags: i64,
    pub visitor_info_flags: i64,
    pub event_types: Json<Vec<EventTypeRef>>,
}

/// Public detail of a single event date.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventDateDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: EventListItem,
    pub description: Option<String>,
    pub participation_info: Option<String>,
    pub meeting_point: Option<String>,
    pub languages: Vec<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub currency_code: Option<String>,
    pub ticket_required: bool,
    pub registration_required: bool,
    pub online_event_url: Option<String>,
    pub entry_time: Option<NaiveTime>,
    pub accessibility_info: Option<String>,
    pub ticket_link: Option<String>,
    pub venue_street: Option<String>,
    pub venue_house_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSummaryEntry {
    pub type_id: i32,
    pub type_name: String,
    pub count: i64,
}

/// Counts listed dates per event type, sorted by type name. A date is
/// counted once per type even when several genres of that type are set.
pub fn type_summary(items: &[EventListItem]) -> Vec<TypeSummaryEntry> {
    let mut counts: BTreeMap<(String, i32), i64> = BTreeMap::new();

    for item in items {
        let mut seen: Vec<i32> = Vec::new();
        for t in item.event_types.0.iter() {
            if seen.contains(&t.type_id) {
                continue;
            }
            seen.push(t.type_id);
            *counts.entry((t.type_name.clone(), t.type_id)).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|((type_name, type_id), count)| TypeSummaryEntry {
            type_id,
            type_name,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_ref(type_id: i32, name: &str, genre_id: Option<i32>) -> EventTypeRef {
        EventTypeRef {
            type_id,
            type_name: name.to_string(),
            genre_id,
            genre_name: None,
        }
    }

    fn item(date_id: i32, types: Vec<EventTypeRef>) -> EventListItem {
        EventListItem {
            event_date_id: date_id,
            event_id: 1,
            title: "Open Stage".to_string(),
            subtitle: None,
            teaser_text: None,
            start_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            start_time: None,
            end_date: None,
            end_time: None,
            all_day: false,
            release_status_id: RELEASE_STATUS_RELEASED,
            organizer_id: 1,
            organizer_name: "Kulturverein".to_string(),
            venue_id: None,
            venue_name: None,
            venue_city: None,
            venue_postal_code: None,
            venue_country_code: None,
            venue_lon: None,
            venue_lat: None,
            space_id: None,
            space_name: None,
            min_age: None,
            max_age: None,
            tags: Vec::new(),
            accessibility_flags: 0,
            visitor_info_flags: 0,
            event_types: Json(types),
        }
    }

    #[test]
    fn test_type_summary_sorted_by_name() {
        let items = vec![
            item(1, vec![type_ref(4, "theatre", None), type_ref(1, "concert", Some(3))]),
            item(2, vec![type_ref(1, "concert", Some(3)), type_ref(1, "concert", Some(5))]),
            item(3, vec![]),
        ];
        let summary = type_summary(&items);
        assert_eq!(
            summary,
            vec![
                TypeSummaryEntry { type_id: 1, type_name: "concert".into(), count: 2 },
                TypeSummaryEntry { type_id: 4, type_name: "theatre".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_type_summary_empty() {
        assert!(type_summary(&[]).is_empty());
    }

    #[test]
    fn test_public_states() {
        assert!(PUBLIC_RELEASE_STATES.contains(&RELEASE_STATUS_RELEASED));
        assert!(PUBLIC_RELEASE_STATES.contains(&RELEASE_STATUS_CANCELLED));
        assert!(!PUBLIC_RELEASE_STATES.contains(&RELEASE_STATUS_DRAFT));
        assert!(!PUBLIC_RELEASE_STATES.contains(&RELEASE_STATUS_REVIEW));
    }

    #[test]
    fn test_type_pairs_serialize_as_arrays() {
        let types: Json<Vec<EventTypePair>> = Json(vec![(1, Some(3)), (2, None)]);
        assert_eq!(serde_json::to_string(&types).unwrap(), "[[1,3],[2,null]]");
    }
}
