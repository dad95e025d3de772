use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Map};
use sqlx::PgConnection;

use super::access;
use crate::auth::CurrentUser;
use crate::db;
use crate::db::events::{NewEvent, NewEventDate};
use crate::models::event::{type_summary, EventTypePair};
use crate::models::Permission;
use crate::sql::{Patch, QueryFilter, UpdateBuilder};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{created, empty_success, success, success_with_meta};
use crate::utils::validate::{
    is_valid_currency_code, is_valid_iso639_1, parse_date, parse_optional_date,
    parse_optional_time, required_text, validate_languages, validate_min_max,
    validate_optional_url,
};

/// One scheduled occurrence as sent by the admin frontend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventDateRequest {
    pub venue_id: Option<i32>,
    pub space_id: Option<i32>,
    pub start_date: String,
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    pub entry_time: Option<String>,
    pub all_day: bool,
    pub accessibility_flags: i64,
    pub visitor_info_flags: i64,
    pub accessibility_info: Option<String>,
    pub ticket_link: Option<String>,
    pub custom: Option<String>,
}

impl EventDateRequest {
    /// Parses and validates the date; `label` prefixes error messages.
    pub fn parse(self, label: &str) -> AppResult<NewEventDate> {
        let field = |name: &str| format!("{}{}", label, name);

        if self.start_date.trim().is_empty() {
            return Err(AppError::validation(format!("{} is required", field("start_date"))));
        }
        let start_date = parse_date(&field("start_date"), &self.start_date)?;
        let start_time = parse_optional_time(&field("start_time"), self.start_time.as_deref())?;
        let end_date = parse_optional_date(&field("end_date"), self.end_date.as_deref())?;
        let end_time = parse_optional_time(&field("end_time"), self.end_time.as_deref())?;
        let entry_time = parse_optional_time(&field("entry_time"), self.entry_time.as_deref())?;

        let effective_end = end_date.unwrap_or(start_date);
        if effective_end < start_date {
            return Err(AppError::validation(format!(
                "{} must not be before {}",
                field("end_date"),
                field("start_date")
            )));
        }
        if let (Some(start), Some(end)) = (start_time, end_time) {
            if effective_end == start_date && end < start {
                return Err(AppError::validation(format!(
                    "{} must not be before {}",
                    field("end_time"),
                    field("start_time")
                )));
            }
        }
        if self.accessibility_flags < 0 || self.visitor_info_flags < 0 {
            return Err(AppError::validation(format!("{} must not be negative", field("flags"))));
        }
        validate_optional_url(&field("ticket_link"), self.ticket_link.as_deref())?;

        Ok(NewEventDate {
            venue_id: self.venue_id,
            space_id: self.space_id,
            start_date,
            start_time,
            end_date,
            end_time,
            entry_time,
            all_day: self.all_day,
            accessibility_flags: self.accessibility_flags,
            visitor_info_flags: self.visitor_info_flags,
            accessibility_info: non_blank(self.accessibility_info),
            ticket_link: self.ticket_link.map(|l| l.trim().to_string()),
            custom: non_blank(self.custom),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateEventRequest {
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
    pub dates: Vec<EventDateRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateEventRequest {
    pub venue_id: Patch<i32>,
    pub space_id: Patch<i32>,
    pub title: Patch<String>,
    pub subtitle: Patch<String>,
    pub description: Patch<String>,
    pub teaser_text: Patch<String>,
    pub participation_info: Patch<String>,
    pub meeting_point: Patch<String>,
    pub min_age: Patch<i32>,
    pub max_age: Patch<i32>,
    pub max_attendees: Patch<i32>,
    pub min_price: Patch<Decimal>,
    pub max_price: Patch<Decimal>,
    pub currency_code: Patch<String>,
    pub ticket_required: Patch<bool>,
    pub registration_required: Patch<bool>,
    pub online_event_url: Patch<String>,
    pub source_url: Patch<String>,
    pub languages: Patch<Vec<String>>,
    pub tags: Patch<Vec<String>>,
    pub types: Patch<Vec<EventTypePair>>,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseStatusRequest {
    pub release_status_id: i32,
    pub release_date: Option<String>,
}

/// Query parameters of the public event listing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventFilterQuery {
    pub lang: String,
    pub past: Option<String>,
    pub start: String,
    pub end: String,
    pub time: String,
    pub search: String,
    pub events: String,
    pub venues: String,
    pub spaces: String,
    pub organizers: String,
    pub countries: String,
    pub postal_code: String,
    pub lon: String,
    pub lat: String,
    pub radius: String,
    pub event_types: String,
    pub genres: String,
    pub space_types: String,
    pub title: String,
    pub city: String,
    pub tags: String,
    pub accessibility: String,
    pub visitor_infos: String,
    pub age: String,
    pub limit: String,
    pub offset: String,
}

impl EventFilterQuery {
    /// Conditions plus the pagination clause. Only released or cancelled
    /// events are ever matched.
    pub fn build(&self) -> AppResult<(QueryFilter, String)> {
        let lang = self.lang.trim();
        if !lang.is_empty() && !is_valid_iso639_1(lang) {
            return Err(AppError::validation(format!("lang format error: {}", lang)));
        }

        let mut filter = QueryFilter::new();

        if !self.start.trim().is_empty() {
            filter.push("ed.start_at >= {}", parse_date("start", &self.start)?);
        } else if self.past.is_none() {
            filter.push_condition("ed.start_at >= NOW()");
        }
        if !self.end.trim().is_empty() {
            filter.push("ed.start_date <= {}", parse_date("end", &self.end)?);
        }

        filter.time_of_day(&self.time, "ed.start_at", "time")?;
        filter.search(&self.search, "e.search_text", "search")?;
        filter.column_in_ints(&self.events, "e.id", "events")?;
        filter.column_in_ints(&self.venues, "v.id", "venues")?;
        filter.column_in_ints(&self.spaces, "s.id", "spaces")?;
        filter.column_in_ints(&self.organizers, "e.organizer_id", "organizers")?;
        filter.strings_with_format(&self.countries, "v.country_code = ANY({})", "countries")?;
        filter.like_any(&self.postal_code, "v.postal_code")?;
        filter.geo_radius(&self.lon, &self.lat, &self.radius, "v.wkb_pos")?;
        filter.json_array_ints(&self.event_types, "e.types", 0)?;
        filter.json_array_ints(&self.genres, "e.types", 1)?;
        filter.column_in_ints(&self.space_types, "s.space_type_id", "space_types")?;
        filter.ilike(&self.title, "e.title", "title")?;
        filter.ilike(&self.city, "v.city", "city")?;
        filter.array_contains(&self.tags, "e.tags")?;
        filter.bitmask(&self.accessibility, "ed.accessibility_flags", "accessibility")?;
        filter.bitmask(&self.visitor_infos, "ed.visitor_info_flags", "visitor_infos")?;
        filter.contained_in_column_range(&self.age, "e.min_age", "e.max_age")?;
        db::events::public_only(&mut filter);

        let pagination = filter.limit_offset(&self.limit, &self.offset)?;
        Ok((filter, pagination))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_non_negative<T: PartialOrd + Default>(field: &str, value: Option<T>) -> AppResult<()> {
    match value {
        Some(v) if v < T::default() => {
            Err(AppError::validation(format!("{} must not be negative", field)))
        }
        _ => Ok(()),
    }
}

fn validate_currency(code: Option<&str>) -> AppResult<()> {
    match code {
        Some(code) if !is_valid_currency_code(code) => Err(AppError::validation(
            "currency_code must be three upper-case letters",
        )),
        _ => Ok(()),
    }
}

/// Event type ids must exist; genres are free to be absent.
async fn validate_types(conn: &mut PgConnection, types: &[EventTypePair]) -> AppResult<()> {
    if types.is_empty() {
        return Ok(());
    }
    let ids: Vec<i32> = types.iter().map(|(type_id, _)| *type_id).collect();
    let unknown = db::events::unknown_event_types(&mut *conn, &ids).await?;
    if let Some(id) = unknown.first() {
        return Err(AppError::validation(format!("event type {} does not exist", id)));
    }

    let (type_ids, genre_ids) = genre_pairs(types);
    if genre_ids.is_empty() {
        return Ok(());
    }
    let mismatched = db::events::mismatched_genres(&mut *conn, &type_ids, &genre_ids).await?;
    if let Some((type_id, genre_id)) = mismatched.first() {
        return Err(AppError::validation(format!(
            "genre {} does not belong to event type {}",
            genre_id, type_id
        )));
    }
    Ok(())
}

/// Parallel type and genre id lists of the pairs that name a genre.
fn genre_pairs(types: &[EventTypePair]) -> (Vec<i32>, Vec<i32>) {
    types
        .iter()
        .filter_map(|(type_id, genre_id)| genre_id.map(|g| (*type_id, g)))
        .unzip()
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateEventRequest>,
) -> AppResult<Response> {
    let title = required_text("title", &payload.title)?;
    validate_non_negative("min_age", payload.min_age)?;
    validate_non_negative("max_attendees", payload.max_attendees)?;
    validate_min_max("age", payload.min_age, payload.max_age)?;
    validate_non_negative("min_price", payload.min_price)?;
    validate_non_negative("max_price", payload.max_price)?;
    validate_min_max("price", payload.min_price, payload.max_price)?;
    validate_currency(payload.currency_code.as_deref())?;
    validate_languages(&payload.languages)?;
    validate_optional_url("online_event_url", payload.online_event_url.as_deref())?;
    validate_optional_url("source_url", payload.source_url.as_deref())?;

    if payload.dates.is_empty() {
        return Err(AppError::validation("at least one event date is required"));
    }
    let dates = payload
        .dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| date.parse(&format!("dates[{}].", i)))
        .collect::<AppResult<Vec<NewEventDate>>>()?;

    let event = NewEvent {
        organizer_id: payload.organizer_id,
        venue_id: payload.venue_id,
        space_id: payload.space_id,
        title,
        subtitle: non_blank(payload.subtitle),
        description: non_blank(payload.description),
        teaser_text: non_blank(payload.teaser_text),
        participation_info: non_blank(payload.participation_info),
        meeting_point: non_blank(payload.meeting_point),
        min_age: payload.min_age,
        max_age: payload.max_age,
        max_attendees: payload.max_attendees,
        min_price: payload.min_price,
        max_price: payload.max_price,
        currency_code: payload.currency_code,
        ticket_required: payload.ticket_required,
        registration_required: payload.registration_required,
        online_event_url: payload.online_event_url.map(|u| u.trim().to_string()),
        source_url: payload.source_url.map(|u| u.trim().to_string()),
        languages: payload.languages,
        tags: payload
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        types: payload.types,
    };

    let mut tx = state.pool.begin().await?;
    access::organizer(&mut tx, user.user_id, event.organizer_id, Permission::ADD_EVENT).await?;
    access::location(&mut tx, user.user_id, event.organizer_id, event.venue_id, event.space_id)
        .await?;
    for date in &dates {
        access::location(&mut tx, user.user_id, event.organizer_id, date.venue_id, date.space_id)
            .await?;
    }
    validate_types(&mut tx, &event.types).await?;

    let event_id = db::events::insert(&mut *tx, &event, user.user_id).await?;
    let mut date_ids = Vec::with_capacity(dates.len());
    for date in &dates {
        date_ids.push(db::events::insert_date(&mut *tx, event_id, date, user.user_id).await?);
    }
    tx.commit().await?;

    tracing::info!(event_id, organizer_id = event.organizer_id, dates = date_ids.len(), "Event created");
    Ok(created(
        json!({ "event_id": event_id, "event_date_ids": date_ids }),
        "Event created",
    ))
}

pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(event_id): Path<i32>,
) -> AppResult<Response> {
    let mut conn = state.pool.acquire().await?;
    access::event(&mut conn, user.user_id, event_id, Permission::NONE).await?;

    let mut event = db::events::get(&mut *conn, event_id)
        .await?
        .ok_or_else(|| AppError::not_found("event not found"))?;
    event.dates = db::events::dates(&mut *conn, event_id).await?;
    Ok(success(event, "Event retrieved"))
}

/// Value after applying `patch` to `current`.
fn patched<T: Clone>(patch: &Patch<T>, current: Option<T>) -> Option<T> {
    match patch {
        Patch::Absent => current,
        Patch::Null => None,
        Patch::Value(v) => Some(v.clone()),
    }
}

fn required_flag(field: &str, patch: &Patch<bool>) -> AppResult<()> {
    match patch {
        Patch::Null => Err(AppError::validation(format!("{} cannot be null", field))),
        _ => Ok(()),
    }
}

pub async fn update_fields(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(event_id): Path<i32>,
    Json(payload): Json<UpdateEventRequest>,
) -> AppResult<Response> {
    match &payload.title {
        Patch::Null => return Err(AppError::validation("title cannot be empty")),
        Patch::Value(title) => {
            required_text("title", title)?;
        }
        Patch::Absent => {}
    }
    required_flag("ticket_required", &payload.ticket_required)?;
    required_flag("registration_required", &payload.registration_required)?;
    validate_non_negative("min_age", payload.min_age.value().copied())?;
    validate_non_negative("max_attendees", payload.max_attendees.value().copied())?;
    validate_non_negative("min_price", payload.min_price.value().copied())?;
    validate_non_negative("max_price", payload.max_price.value().copied())?;
    validate_currency(payload.currency_code.value().map(String::as_str))?;
    if let Some(languages) = payload.languages.value() {
        validate_languages(languages)?;
    }
    for (field, url) in [
        ("online_event_url", &payload.online_event_url),
        ("source_url", &payload.source_url),
    ] {
        let url = url.value().map(String::as_str).filter(|u| !u.trim().is_empty());
        validate_optional_url(field, url)?;
    }

    let mut tx = state.pool.begin().await?;
    let organizer_id = access::event(&mut tx, user.user_id, event_id, Permission::EDIT_EVENT).await?;
    let current = db::events::get(&mut *tx, event_id)
        .await?
        .ok_or_else(|| AppError::not_found("event not found"))?;

    validate_min_max(
        "age",
        patched(&payload.min_age, current.min_age),
        patched(&payload.max_age, current.max_age),
    )?;
    validate_min_max(
        "price",
        patched(&payload.min_price, current.min_price),
        patched(&payload.max_price, current.max_price),
    )?;
    if !payload.venue_id.is_absent() || !payload.space_id.is_absent() {
        access::location(
            &mut tx,
            user.user_id,
            organizer_id,
            patched(&payload.venue_id, current.venue_id),
            patched(&payload.space_id, current.space_id),
        )
        .await?;
    }
    if let Some(types) = payload.types.value() {
        validate_types(&mut tx, types).await?;
    }

    let types = match payload.types {
        Patch::Absent => Patch::Absent,
        Patch::Null => Patch::Value(json!([])),
        Patch::Value(types) => Patch::Value(json!(types)),
    };

    let mut builder = UpdateBuilder::new();
    builder
        .set("venue_id", payload.venue_id)
        .set("space_id", payload.space_id)
        .set_text("title", payload.title)
        .set_text("subtitle", payload.subtitle)
        .set_text("description", payload.description)
        .set_text("teaser_text", payload.teaser_text)
        .set_text("participation_info", payload.participation_info)
        .set_text("meeting_point", payload.meeting_point)
        .set("min_age", payload.min_age)
        .set("max_age", payload.max_age)
        .set("max_attendees", payload.max_attendees)
        .set("min_price", payload.min_price)
        .set("max_price", payload.max_price)
        .set_text("currency_code", payload.currency_code)
        .set("ticket_required", payload.ticket_required)
        .set("registration_required", payload.registration_required)
        .set_text("online_event_url", payload.online_event_url)
        .set_text("source_url", payload.source_url)
        .set_text_array("languages", payload.languages)
        .set_text_array("tags", payload.tags)
        .set("types", types);

    db::apply_update(&mut *tx, builder, "event", event_id, "event").await?;
    tx.commit().await?;

    tracing::info!(event_id, user_id = user.user_id, "Event updated");
    Ok(empty_success("Event updated"))
}

pub async fn update_release_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(event_id): Path<i32>,
    Json(payload): Json<ReleaseStatusRequest>,
) -> AppResult<Response> {
    let release_date = parse_optional_date("release_date", payload.release_date.as_deref())?;

    let mut tx = state.pool.begin().await?;
    access::event(&mut tx, user.user_id, event_id, Permission::RELEASE_EVENT).await?;
    if !db::lookups::release_status_exists(&mut *tx, payload.release_status_id).await? {
        return Err(AppError::validation(format!(
            "release status {} does not exist",
            payload.release_status_id
        )));
    }
    db::events::set_release_status(&mut *tx, event_id, payload.release_status_id, release_date)
        .await?;
    tx.commit().await?;

    tracing::info!(
        event_id,
        release_status_id = payload.release_status_id,
        user_id = user.user_id,
        "Event release status changed"
    );
    Ok(empty_success("Release status updated"))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(event_id): Path<i32>,
) -> AppResult<Response> {
    let mut tx = state.pool.begin().await?;
    access::event(&mut tx, user.user_id, event_id, Permission::DELETE_EVENT).await?;
    db::events::delete(&mut *tx, event_id).await?;
    tx.commit().await?;

    tracing::info!(event_id, user_id = user.user_id, "Event deleted");
    Ok(empty_success("Event deleted"))
}

pub async fn public_list(
    State(state): State<AppState>,
    Query(query): Query<EventFilterQuery>,
) -> AppResult<Response> {
    let (filter, pagination) = query.build()?;
    let (events, total) = db::events::list_public(&state.pool, filter, &pagination).await?;
    let summary = type_summary(&events);

    let mut metadata = Map::new();
    metadata.insert("events_count".to_string(), json!(events.len()));
    if !query.lang.trim().is_empty() {
        metadata.insert("language".to_string(), json!(query.lang.trim()));
    }

    Ok(success_with_meta(
        json!({ "total": total, "events": events, "type_summary": summary }),
        "Events retrieved",
        metadata,
    ))
}

pub async fn public_date_detail(
    State(state): State<AppState>,
    Path((event_id, date_id)): Path<(i32, i32)>,
) -> AppResult<Response> {
    let detail = db::events::public_date_detail(&state.pool, event_id, date_id)
        .await?
        .ok_or_else(|| AppError::not_found("event date not found"))?;
    Ok(success(detail, "Event date retrieved"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(start_date: &str) -> EventDateRequest {
        EventDateRequest {
            start_date: start_date.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_genre_pairs_skip_types_without_genre() {
        let types: Vec<EventTypePair> = vec![(1, Some(4)), (2, None), (3, Some(9))];
        assert_eq!(genre_pairs(&types), (vec![1, 3], vec![4, 9]));
        assert_eq!(genre_pairs(&[(5, None)]), (vec![], vec![]));
    }

    #[test]
    fn test_date_requires_start() {
        assert!(date("").parse("").is_err());
        assert!(date("01.05.2025").parse("").is_err());
        assert!(date("2025-05-01").parse("").is_ok());
    }

    #[test]
    fn test_date_end_not_before_start() {
        let mut d = date("2025-05-02");
        d.end_date = Some("2025-05-01".to_string());
        assert!(d.parse("").is_err());

        let mut d = date("2025-05-01");
        d.start_time = Some("20:00".to_string());
        d.end_time = Some("19:30".to_string());
        assert!(d.clone().parse("").is_err());

        // Overnight events end on a later day.
        d.end_date = Some("2025-05-02".to_string());
        let parsed = d.parse("").unwrap();
        assert_eq!(parsed.end_time.unwrap().to_string(), "19:30:00");
    }

    #[test]
    fn test_date_ticket_link_must_be_http() {
        let mut d = date("2025-05-01");
        d.ticket_link = Some("mailto:box@example.org".to_string());
        let err = d.parse("dates[0].").unwrap_err();
        assert!(err.to_string().contains("dates[0].ticket_link"));
    }

    #[test]
    fn test_default_listing_is_upcoming_and_public() {
        let (filter, pagination) = EventFilterQuery::default().build().unwrap();
        assert_eq!(
            filter.where_clause(),
            "WHERE ed.start_at >= NOW() AND e.release_status_id = ANY($1)"
        );
        assert_eq!(pagination, "");
    }

    #[test]
    fn test_past_and_start_disable_upcoming_default() {
        let query = EventFilterQuery {
            past: Some(String::new()),
            ..Default::default()
        };
        let (filter, _) = query.build().unwrap();
        assert_eq!(filter.conditions().len(), 1);

        let query = EventFilterQuery {
            start: "2025-05-01".to_string(),
            end: "2025-05-31".to_string(),
            ..Default::default()
        };
        let (filter, _) = query.build().unwrap();
        assert_eq!(
            filter.conditions(),
            &[
                "ed.start_at >= $1".to_string(),
                "ed.start_date <= $2".to_string(),
                "e.release_status_id = ANY($3)".to_string(),
            ]
        );
    }

    #[test]
    fn test_filter_placeholders_follow_argument_order() {
        let query = EventFilterQuery {
            past: Some("true".to_string()),
            event_types: "1,2".to_string(),
            genres: "7".to_string(),
            accessibility: "0,3".to_string(),
            age: "12".to_string(),
            limit: "20".to_string(),
            offset: "40".to_string(),
            ..Default::default()
        };
        let (filter, pagination) = query.build().unwrap();
        let conditions = filter.conditions();
        assert!(conditions[0].contains("(elem->>0)::int = ANY($1)"));
        assert!(conditions[1].contains("(elem->>1)::int = ANY($2)"));
        assert_eq!(conditions[2], "(ed.accessibility_flags & $3) = $3");
        assert_eq!(
            conditions[3],
            "($4 BETWEEN COALESCE(e.min_age, 0) AND COALESCE(e.max_age, 1000))"
        );
        assert_eq!(conditions[4], "e.release_status_id = ANY($5)");
        assert_eq!(pagination, "LIMIT $6 OFFSET $7");
    }

    #[test]
    fn test_malformed_parameters_are_rejected() {
        let cases = [
            EventFilterQuery { lang: "deu".into(), ..Default::default() },
            EventFilterQuery { start: "tomorrow".into(), ..Default::default() },
            EventFilterQuery { time: "9".into(), ..Default::default() },
            EventFilterQuery { venues: "1,x".into(), ..Default::default() },
            EventFilterQuery { accessibility: "63".into(), ..Default::default() },
            EventFilterQuery { age: "1,2,3".into(), ..Default::default() },
            EventFilterQuery { limit: "0".into(), ..Default::default() },
        ];
        for query in cases {
            assert!(query.build().is_err(), "{:?} should be rejected", query);
        }
    }

    #[test]
    fn test_patched_merges_with_current() {
        assert_eq!(patched(&Patch::Absent, Some(3)), Some(3));
        assert_eq!(patched(&Patch::Null, Some(3)), None);
        assert_eq!(patched(&Patch::Value(5), Some(3)), Some(5));
    }

    #[test]
    fn test_negative_values_rejected() {
        assert!(validate_non_negative("min_age", Some(-1)).is_err());
        assert!(validate_non_negative("min_price", Some(Decimal::new(-50, 2))).is_err());
        assert!(validate_non_negative::<i32>("min_age", None).is_ok());
    }
}
