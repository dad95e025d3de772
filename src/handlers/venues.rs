use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map};

use super::access::{self, PasswordConfirmation};
use crate::auth::CurrentUser;
use crate::db;
use crate::db::venues::NewVenue;
use crate::models::venue::feature_collection;
use crate::models::Permission;
use crate::sql::{Patch, QueryFilter, UpdateBuilder};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{created, empty_success, success, success_with_meta};
use crate::utils::validate::{is_valid_email, required_text, validate_optional_url};

/// Venue name folded the same way as search input.
const FOLDED_VENUE_NAME: &str =
    "replace(replace(replace(replace(lower(v.name), 'ä', 'ae'), 'ö', 'oe'), 'ü', 'ue'), 'ß', 'ss')";

#[derive(Debug, Deserialize)]
pub struct CreateVenueRequest {
    pub organizer_id: i32,
    pub venue_type_id: Option<i32>,
    #[serde(default)]
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

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateVenueRequest {
    pub venue_type_id: Patch<i32>,
    pub name: Patch<String>,
    pub description: Patch<String>,
    pub contact_email: Patch<String>,
    pub contact_phone: Patch<String>,
    pub website_link: Patch<String>,
    pub street: Patch<String>,
    pub house_number: Patch<String>,
    pub postal_code: Patch<String>,
    pub city: Patch<String>,
    pub state_code: Patch<String>,
    pub country_code: Patch<String>,
    pub lon: Patch<f64>,
    pub lat: Patch<f64>,
}

/// Query parameters of the public venue listings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VenueFilterQuery {
    pub search: String,
    pub city: String,
    pub countries: String,
    pub postal_code: String,
    pub venue_types: String,
    pub lon: String,
    pub lat: String,
    pub radius: String,
    pub limit: String,
    pub offset: String,
}

impl VenueFilterQuery {
    /// Conditions plus the pagination clause.
    pub fn build(&self) -> AppResult<(QueryFilter, String)> {
        self.build_with(false)
    }

    /// With `positioned_only`, venues without coordinates are excluded before
    /// pagination so a map page is never short.
    pub fn build_with(&self, positioned_only: bool) -> AppResult<(QueryFilter, String)> {
        let mut filter = QueryFilter::new();
        if positioned_only {
            filter.push_condition("v.wkb_pos IS NOT NULL");
        }
        filter.search(&self.search, FOLDED_VENUE_NAME, "search")?;
        filter.ilike(&self.city, "v.city", "city")?;
        filter.strings_with_format(&self.countries, "v.country_code = ANY({})", "countries")?;
        filter.like_any(&self.postal_code, "v.postal_code")?;
        filter.column_in_ints(&self.venue_types, "v.venue_type_id", "venue_types")?;
        filter.geo_radius(&self.lon, &self.lat, &self.radius, "v.wkb_pos")?;
        let pagination = filter.limit_offset(&self.limit, &self.offset)?;
        Ok((filter, pagination))
    }
}

fn validate_contact(email: Option<&str>, website: Option<&str>) -> AppResult<()> {
    if let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) {
        if !is_valid_email(email) {
            return Err(AppError::validation("contact_email is not a valid email address"));
        }
    }
    match website.map(str::trim) {
        None | Some("") => Ok(()),
        link => validate_optional_url("website_link", link),
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateVenueRequest>,
) -> AppResult<Response> {
    let name = required_text("name", &payload.name)?;
    validate_contact(payload.contact_email.as_deref(), payload.website_link.as_deref())?;
    match (payload.lon, payload.lat) {
        (None, None) => {}
        (Some(lon), Some(lat)) if (-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat) => {}
        (Some(_), Some(_)) => return Err(AppError::validation("lon/lat out of range")),
        _ => return Err(AppError::validation("lon and lat must be provided together")),
    }

    let venue = NewVenue {
        organizer_id: payload.organizer_id,
        venue_type_id: payload.venue_type_id,
        name,
        description: trimmed(payload.description),
        contact_email: trimmed(payload.contact_email),
        contact_phone: trimmed(payload.contact_phone),
        website_link: trimmed(payload.website_link),
        street: trimmed(payload.street),
        house_number: trimmed(payload.house_number),
        postal_code: trimmed(payload.postal_code),
        city: trimmed(payload.city),
        state_code: trimmed(payload.state_code),
        country_code: trimmed(payload.country_code),
        lon: payload.lon,
        lat: payload.lat,
    };

    let mut tx = state.pool.begin().await?;
    access::organizer(&mut tx, user.user_id, venue.organizer_id, Permission::ADD_VENUE).await?;
    let venue_id = db::venues::insert(&mut *tx, &venue, user.user_id).await?;
    tx.commit().await?;

    tracing::info!(venue_id, organizer_id = venue.organizer_id, "Venue created");
    Ok(created(json!({ "venue_id": venue_id }), "Venue created"))
}

pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(venue_id): Path<i32>,
) -> AppResult<Response> {
    let mut conn = state.pool.acquire().await?;
    access::venue(&mut conn, user.user_id, venue_id, Permission::NONE).await?;

    let venue = db::venues::get(&mut *conn, venue_id)
        .await?
        .ok_or_else(|| AppError::not_found("venue not found"))?;
    Ok(success(venue, "Venue retrieved"))
}

pub async fn update_fields(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(venue_id): Path<i32>,
    Json(payload): Json<UpdateVenueRequest>,
) -> AppResult<Response> {
    match &payload.name {
        Patch::Null => return Err(AppError::validation("name cannot be empty")),
        Patch::Value(name) => {
            required_text("name", name)?;
        }
        Patch::Absent => {}
    }
    validate_contact(
        payload.contact_email.value().map(String::as_str),
        payload.website_link.value().map(String::as_str),
    )?;

    let mut builder = UpdateBuilder::new();
    builder
        .set("venue_type_id", payload.venue_type_id)
        .set_text("name", payload.name)
        .set_text("description", payload.description)
        .set_text("contact_email", payload.contact_email)
        .set_text("contact_phone", payload.contact_phone)
        .set_text("website_link", payload.website_link)
        .set_text("street", payload.street)
        .set_text("house_number", payload.house_number)
        .set_text("postal_code", payload.postal_code)
        .set_text("city", payload.city)
        .set_text("state_code", payload.state_code)
        .set_text("country_code", payload.country_code)
        .set_point("wkb_pos", payload.lon, payload.lat)?;

    let mut tx = state.pool.begin().await?;
    access::venue(&mut tx, user.user_id, venue_id, Permission::EDIT_VENUE).await?;
    db::apply_update(&mut *tx, builder, "venue", venue_id, "venue").await?;
    tx.commit().await?;

    tracing::info!(venue_id, user_id = user.user_id, "Venue updated");
    Ok(empty_success("Venue updated"))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(venue_id): Path<i32>,
    Json(payload): Json<PasswordConfirmation>,
) -> AppResult<Response> {
    let password = payload.password()?;

    let mut tx = state.pool.begin().await?;
    access::confirm_password(&mut tx, user.user_id, password).await?;
    access::venue(&mut tx, user.user_id, venue_id, Permission::DELETE_VENUE).await?;
    db::venues::delete(&mut *tx, venue_id).await?;
    tx.commit().await?;

    tracing::info!(venue_id, user_id = user.user_id, "Venue deleted");
    Ok(empty_success("Venue deleted"))
}

pub async fn public_list(
    State(state): State<AppState>,
    Query(query): Query<VenueFilterQuery>,
) -> AppResult<Response> {
    let (filter, pagination) = query.build()?;
    let venues = db::venues::list_public(&state.pool, filter, &pagination).await?;

    let mut metadata = Map::new();
    metadata.insert("venues_count".to_string(), json!(venues.len()));
    Ok(success_with_meta(venues, "Venues retrieved", metadata))
}

pub async fn public_geojson(
    State(state): State<AppState>,
    Query(query): Query<VenueFilterQuery>,
) -> AppResult<Response> {
    let (filter, pagination) = query.build_with(true)?;
    let venues = db::venues::list_public(&state.pool, filter, &pagination).await?;
    Ok(success(feature_collection(&venues), "Venues retrieved"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_has_no_conditions() {
        let (filter, pagination) = VenueFilterQuery::default().build().unwrap();
        assert!(filter.is_empty());
        assert_eq!(filter.where_clause(), "");
        assert_eq!(pagination, "");
    }

    #[test]
    fn test_filters_number_placeholders_in_order() {
        let query = VenueFilterQuery {
            city: "Flens*".to_string(),
            countries: "DEU, DNK".to_string(),
            venue_types: "1,2".to_string(),
            limit: "10".to_string(),
            ..Default::default()
        };
        let (filter, pagination) = query.build().unwrap();
        assert_eq!(
            filter.conditions(),
            &[
                "v.city ILIKE $1".to_string(),
                "v.country_code = ANY($2)".to_string(),
                "(v.venue_type_id = ANY($3))".to_string(),
            ]
        );
        assert_eq!(pagination, "LIMIT $4");
    }

    #[test]
    fn test_map_listing_filters_positions_before_paging() {
        let query = VenueFilterQuery {
            city: "Flensburg".to_string(),
            limit: "5".to_string(),
            ..Default::default()
        };
        let (filter, pagination) = query.build_with(true).unwrap();
        assert_eq!(
            filter.where_clause(),
            "WHERE v.wkb_pos IS NOT NULL AND v.city ILIKE $1"
        );
        assert_eq!(pagination, "LIMIT $2");

        let (filter, _) = query.build().unwrap();
        assert!(!filter.where_clause().contains("wkb_pos"));
    }

    #[test]
    fn test_partial_geo_is_ignored_and_bad_geo_rejected() {
        let query = VenueFilterQuery {
            lon: "9.4".to_string(),
            lat: "54.7".to_string(),
            ..Default::default()
        };
        assert!(query.build().unwrap().0.is_empty());

        let query = VenueFilterQuery {
            lon: "200".to_string(),
            lat: "54.7".to_string(),
            radius: "1000".to_string(),
            ..Default::default()
        };
        assert!(query.build().is_err());
    }

    #[test]
    fn test_contact_validation() {
        assert!(validate_contact(Some("info@example.org"), Some("https://example.org")).is_ok());
        assert!(validate_contact(Some(""), None).is_ok());
        assert!(validate_contact(Some("nope"), None).is_err());
        assert!(validate_contact(None, Some("ftp://example.org")).is_err());
    }
}
