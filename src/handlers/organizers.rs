use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::access::{self, PasswordConfirmation};
use crate::auth::CurrentUser;
use crate::db;
use crate::models::Permission;
use crate::sql::{Patch, UpdateBuilder};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{created, empty_success, success};
use crate::utils::validate::{is_valid_email, required_text, validate_optional_url};

#[derive(Debug, Deserialize)]
pub struct CreateOrganizerRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateOrganizerRequest {
    pub name: Patch<String>,
    pub description: Patch<String>,
    pub legal_form: Patch<String>,
    pub contact_email: Patch<String>,
    pub contact_phone: Patch<String>,
    pub website_link: Patch<String>,
    pub street: Patch<String>,
    pub house_number: Patch<String>,
    pub address_addition: Patch<String>,
    pub postal_code: Patch<String>,
    pub city: Patch<String>,
    pub state_code: Patch<String>,
    pub country_code: Patch<String>,
    pub lon: Patch<f64>,
    pub lat: Patch<f64>,
}

#[derive(Debug, Deserialize)]
pub struct OrganizerSearchQuery {
    pub search: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateOrganizerRequest>,
) -> AppResult<Response> {
    let name = required_text("name", &payload.name)?;

    let mut tx = state.pool.begin().await?;
    let organizer_id = db::organizers::insert(&mut *tx, &name, Uuid::new_v4()).await?;
    db::organizers::upsert_user_link(&mut *tx, user.user_id, organizer_id, Permission::ADMIN)
        .await?;
    db::organizers::insert_joined_member(&mut *tx, organizer_id, user.user_id).await?;
    tx.commit().await?;

    tracing::info!(organizer_id, user_id = user.user_id, "Organizer created");
    Ok(created(json!({ "organizer_id": organizer_id }), "Organizer created"))
}

pub async fn dashboard(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    let entries = db::organizers::dashboard(&state.pool, user.user_id).await?;
    Ok(success(entries, "Dashboard retrieved"))
}

pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(organizer_id): Path<i32>,
) -> AppResult<Response> {
    let mut conn = state.pool.acquire().await?;
    access::organizer(&mut conn, user.user_id, organizer_id, Permission::NONE).await?;

    let organizer = db::organizers::get(&mut *conn, organizer_id)
        .await?
        .ok_or_else(|| AppError::not_found("organizer not found"))?;
    Ok(success(organizer, "Organizer retrieved"))
}

pub async fn update_fields(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(organizer_id): Path<i32>,
    Json(payload): Json<UpdateOrganizerRequest>,
) -> AppResult<Response> {
    match &payload.name {
        Patch::Null => return Err(AppError::validation("name cannot be empty")),
        Patch::Value(name) => {
            required_text("name", name)?;
        }
        Patch::Absent => {}
    }
    if let Some(email) = payload.contact_email.value() {
        if !email.trim().is_empty() && !is_valid_email(email.trim()) {
            return Err(AppError::validation("contact_email is not a valid email address"));
        }
    }
    if let Some(link) = payload.website_link.value() {
        if !link.trim().is_empty() {
            validate_optional_url("website_link", Some(link))?;
        }
    }

    let mut builder = UpdateBuilder::new();
    builder
        .set_text("name", payload.name)
        .set_text("description", payload.description)
        .set_text("legal_form", payload.legal_form)
        .set_text("contact_email", payload.contact_email)
        .set_text("contact_phone", payload.contact_phone)
        .set_text("website_link", payload.website_link)
        .set_text("street", payload.street)
        .set_text("house_number", payload.house_number)
        .set_text("address_addition", payload.address_addition)
        .set_text("postal_code", payload.postal_code)
        .set_text("city", payload.city)
        .set_text("state_code", payload.state_code)
        .set_text("country_code", payload.country_code)
        .set_point("wkb_pos", payload.lon, payload.lat)?;

    let mut tx = state.pool.begin().await?;
    access::organizer(&mut tx, user.user_id, organizer_id, Permission::EDIT_ORGANIZER).await?;
    db::apply_update(&mut *tx, builder, "organizer", organizer_id, "organizer").await?;
    tx.commit().await?;

    tracing::info!(organizer_id, user_id = user.user_id, "Organizer updated");
    Ok(empty_success("Organizer updated"))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(organizer_id): Path<i32>,
    Json(payload): Json<PasswordConfirmation>,
) -> AppResult<Response> {
    let password = payload.password()?;

    let mut tx = state.pool.begin().await?;
    access::confirm_password(&mut tx, user.user_id, password).await?;
    access::organizer(&mut tx, user.user_id, organizer_id, Permission::DELETE_ORGANIZER).await?;
    if !db::organizers::delete(&mut *tx, organizer_id).await? {
        return Err(AppError::not_found("organizer not found"));
    }
    tx.commit().await?;

    tracing::info!(organizer_id, user_id = user.user_id, "Organizer deleted");
    Ok(empty_success("Organizer deleted"))
}

pub async fn venues(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(organizer_id): Path<i32>,
) -> AppResult<Response> {
    let mut conn = state.pool.acquire().await?;
    access::organizer(&mut conn, user.user_id, organizer_id, Permission::NONE).await?;
    let venues = db::venues::list_by_organizer(&mut *conn, organizer_id).await?;
    Ok(success(venues, "Venues retrieved"))
}

pub async fn events(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(organizer_id): Path<i32>,
) -> AppResult<Response> {
    let mut conn = state.pool.acquire().await?;
    access::organizer(&mut conn, user.user_id, organizer_id, Permission::NONE).await?;
    let events = db::events::list_by_organizer(&mut *conn, organizer_id).await?;
    Ok(success(events, "Events retrieved"))
}

pub async fn public_search(
    State(state): State<AppState>,
    Query(query): Query<OrganizerSearchQuery>,
) -> AppResult<Response> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("search parameter is required"))?;

    let organizers = db::organizers::search_public(&state.pool, search).await?;
    Ok(success(organizers, "Organizers retrieved"))
}

pub async fn public_get(
    State(state): State<AppState>,
    Path(organizer_id): Path<i32>,
) -> AppResult<Response> {
    let organizer = db::organizers::get_public(&state.pool, organizer_id)
        .await?
        .ok_or_else(|| AppError::not_found("organizer not found"))?;
    Ok(success(organizer, "Organizer retrieved"))
}
