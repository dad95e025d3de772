use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde_json::json;

use super::access::{self, PasswordConfirmation};
use super::events::EventDateRequest;
use crate::auth::CurrentUser;
use crate::db;
use crate::models::Permission;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{created, empty_success};

/// An event keeps at least one scheduled date; delete the event instead.
fn ensure_dates_remain(remaining: i64) -> AppResult<()> {
    if remaining == 0 {
        return Err(AppError::validation("cannot delete the last date of an event"));
    }
    Ok(())
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(event_id): Path<i32>,
    Json(payload): Json<EventDateRequest>,
) -> AppResult<Response> {
    let date = payload.parse("")?;

    let mut tx = state.pool.begin().await?;
    let organizer_id = access::event(
        &mut tx,
        user.user_id,
        event_id,
        Permission::ADD_EVENT | Permission::EDIT_EVENT,
    )
    .await?;
    access::location(&mut tx, user.user_id, organizer_id, date.venue_id, date.space_id).await?;
    let date_id = db::events::insert_date(&mut *tx, event_id, &date, user.user_id).await?;
    tx.commit().await?;

    tracing::info!(event_id, date_id, user_id = user.user_id, "Event date added");
    Ok(created(json!({ "event_date_id": date_id }), "Event date created"))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((event_id, date_id)): Path<(i32, i32)>,
    Json(payload): Json<EventDateRequest>,
) -> AppResult<Response> {
    let date = payload.parse("")?;

    let mut tx = state.pool.begin().await?;
    let organizer_id = access::event(
        &mut tx,
        user.user_id,
        event_id,
        Permission::ADD_EVENT | Permission::EDIT_EVENT,
    )
    .await?;
    access::location(&mut tx, user.user_id, organizer_id, date.venue_id, date.space_id).await?;
    if !db::events::update_date(&mut *tx, event_id, date_id, &date).await? {
        return Err(AppError::not_found("event date not found"));
    }
    tx.commit().await?;

    tracing::info!(event_id, date_id, user_id = user.user_id, "Event date updated");
    Ok(empty_success("Event date updated"))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((event_id, date_id)): Path<(i32, i32)>,
    Json(payload): Json<PasswordConfirmation>,
) -> AppResult<Response> {
    let password = payload.password()?;

    let mut tx = state.pool.begin().await?;
    access::confirm_password(&mut tx, user.user_id, password).await?;
    access::event(
        &mut tx,
        user.user_id,
        event_id,
        Permission::EDIT_EVENT | Permission::DELETE_EVENT,
    )
    .await?;
    db::events::lock(&mut *tx, event_id).await?;
    if !db::events::delete_date(&mut *tx, event_id, date_id).await? {
        return Err(AppError::not_found("event date not found"));
    }
    ensure_dates_remain(db::events::date_count(&mut *tx, event_id).await?)?;
    tx.commit().await?;

    tracing::info!(event_id, date_id, user_id = user.user_id, "Event date deleted");
    Ok(empty_success("Event date deleted"))
}
