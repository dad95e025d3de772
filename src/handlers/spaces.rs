use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::access::{self, PasswordConfirmation};
use crate::auth::CurrentUser;
use crate::db;
use crate::db::spaces::NewSpace;
use crate::models::Permission;
use crate::sql::{Patch, UpdateBuilder};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{created, empty_success, success};
use crate::utils::validate::{required_text, validate_optional_url};

#[derive(Debug, Deserialize)]
pub struct CreateSpaceRequest {
    pub venue_id: i32,
    pub space_type_id: Option<i32>,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub total_capacity: Option<i32>,
    pub seating_capacity: Option<i32>,
    pub building_level: Option<i32>,
    pub website_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateSpaceRequest {
    pub space_type_id: Patch<i32>,
    pub name: Patch<String>,
    pub description: Patch<String>,
    pub total_capacity: Patch<i32>,
    pub seating_capacity: Patch<i32>,
    pub building_level: Patch<i32>,
    pub website_link: Patch<String>,
}

/// Trimmed link, `None` when blank.
fn website_link(link: Option<String>) -> AppResult<Option<String>> {
    let link = link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty());
    validate_optional_url("website_link", link.as_deref())?;
    Ok(link)
}

fn validate_capacity(field: &str, value: Option<i32>) -> AppResult<()> {
    match value {
        Some(v) if v < 0 => Err(AppError::validation(format!("{} must not be negative", field))),
        _ => Ok(()),
    }
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateSpaceRequest>,
) -> AppResult<Response> {
    let name = required_text("name", &payload.name)?;
    validate_capacity("total_capacity", payload.total_capacity)?;
    validate_capacity("seating_capacity", payload.seating_capacity)?;
    let website_link = website_link(payload.website_link)?;

    let space = NewSpace {
        venue_id: payload.venue_id,
        space_type_id: payload.space_type_id,
        name,
        description: payload
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        total_capacity: payload.total_capacity,
        seating_capacity: payload.seating_capacity,
        building_level: payload.building_level,
        website_link,
    };

    let mut tx = state.pool.begin().await?;
    access::venue(&mut tx, user.user_id, space.venue_id, Permission::ADD_SPACE).await?;
    let space_id = db::spaces::insert(&mut *tx, &space, user.user_id).await?;
    tx.commit().await?;

    tracing::info!(space_id, venue_id = space.venue_id, "Space created");
    Ok(created(json!({ "space_id": space_id }), "Space created"))
}

pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(space_id): Path<i32>,
) -> AppResult<Response> {
    let mut conn = state.pool.acquire().await?;
    access::space(&mut conn, user.user_id, space_id, Permission::NONE).await?;

    let space = db::spaces::get(&mut *conn, space_id)
        .await?
        .ok_or_else(|| AppError::not_found("space not found"))?;
    Ok(success(space, "Space retrieved"))
}

pub async fn update_fields(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(space_id): Path<i32>,
    Json(payload): Json<UpdateSpaceRequest>,
) -> AppResult<Response> {
    match &payload.name {
        Patch::Null => return Err(AppError::validation("name cannot be empty")),
        Patch::Value(name) => {
            required_text("name", name)?;
        }
        Patch::Absent => {}
    }
    validate_capacity("total_capacity", payload.total_capacity.value().copied())?;
    validate_capacity("seating_capacity", payload.seating_capacity.value().copied())?;
    if let Some(link) = payload.website_link.value().filter(|l| !l.trim().is_empty()) {
        validate_optional_url("website_link", Some(link))?;
    }

    let mut builder = UpdateBuilder::new();
    builder
        .set("space_type_id", payload.space_type_id)
        .set_text("name", payload.name)
        .set_text("description", payload.description)
        .set("total_capacity", payload.total_capacity)
        .set("seating_capacity", payload.seating_capacity)
        .set("building_level", payload.building_level)
        .set_text("website_link", payload.website_link);

    let mut tx = state.pool.begin().await?;
    access::space(&mut tx, user.user_id, space_id, Permission::EDIT_SPACE).await?;
    db::apply_update(&mut *tx, builder, "space", space_id, "space").await?;
    tx.commit().await?;

    tracing::info!(space_id, user_id = user.user_id, "Space updated");
    Ok(empty_success("Space updated"))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(space_id): Path<i32>,
    Json(payload): Json<PasswordConfirmation>,
) -> AppResult<Response> {
    let password = payload.password()?;

    let mut tx = state.pool.begin().await?;
    access::confirm_password(&mut tx, user.user_id, password).await?;
    access::space(&mut tx, user.user_id, space_id, Permission::DELETE_SPACE).await?;
    db::spaces::delete(&mut *tx, space_id).await?;
    tx.commit().await?;

    tracing::info!(space_id, user_id = user.user_id, "Space deleted");
    Ok(empty_success("Space deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_must_not_be_negative() {
        assert!(validate_capacity("total_capacity", None).is_ok());
        assert!(validate_capacity("total_capacity", Some(0)).is_ok());
        assert!(validate_capacity("total_capacity", Some(-1)).is_err());
    }

    #[test]
    fn test_blank_website_link_is_absent() {
        assert_eq!(website_link(Some("  ".to_string())).unwrap(), None);
        assert_eq!(website_link(None).unwrap(), None);
        assert_eq!(
            website_link(Some(" https://example.org/saal ".to_string())).unwrap(),
            Some("https://example.org/saal".to_string())
        );
        assert!(website_link(Some("example.org".to_string())).is_err());
    }
}
