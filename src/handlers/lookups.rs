use axum::extract::{Path, State};
use axum::response::Response;

use crate::db;
use crate::db::lookups::LookupTable;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::success;

async fn choosable(state: &AppState, table: LookupTable) -> AppResult<Response> {
    let items = db::lookups::choosable(&state.pool, table).await?;
    Ok(success(items, "Choosable items retrieved"))
}

pub async fn venue_types(State(state): State<AppState>) -> AppResult<Response> {
    choosable(&state, LookupTable::VenueType).await
}

pub async fn space_types(State(state): State<AppState>) -> AppResult<Response> {
    choosable(&state, LookupTable::SpaceType).await
}

pub async fn event_types(State(state): State<AppState>) -> AppResult<Response> {
    choosable(&state, LookupTable::EventType).await
}

pub async fn release_states(State(state): State<AppState>) -> AppResult<Response> {
    choosable(&state, LookupTable::ReleaseStatus).await
}

pub async fn venues_of_organizer(
    State(state): State<AppState>,
    Path(organizer_id): Path<i32>,
) -> AppResult<Response> {
    let venues = db::lookups::venues_of_organizer(&state.pool, organizer_id).await?;
    Ok(success(venues, "Choosable venues retrieved"))
}

pub async fn spaces_of_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<i32>,
) -> AppResult<Response> {
    let spaces = db::lookups::spaces_of_venue(&state.pool, venue_id).await?;
    Ok(success(spaces, "Choosable spaces retrieved"))
}

pub async fn genres_of_event_type(
    State(state): State<AppState>,
    Path(event_type_id): Path<i32>,
) -> AppResult<Response> {
    let genres = db::lookups::genres_of_event_type(&state.pool, event_type_id).await?;
    Ok(success(genres, "Choosable genres retrieved"))
}

pub async fn type_genre_lookup(State(state): State<AppState>) -> AppResult<Response> {
    let types = db::lookups::type_genre_lookup(&state.pool).await?;
    Ok(success(types, "Event types and genres retrieved"))
}

pub async fn accessibility_flags(State(state): State<AppState>) -> AppResult<Response> {
    let flags = db::lookups::accessibility_flags(&state.pool).await?;
    Ok(success(flags, "Accessibility flags retrieved"))
}
