use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::config::{create_cors_layer, create_security_headers_layers};
use crate::handlers::{
    auth, event_dates, events, health_check, lookups, organizers, spaces, team, user, venues,
};
use crate::state::AppState;

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/user/profile", get(user::get_profile).put(user::update_profile))
        .route("/user/choosable-organizers", get(user::choosable_organizers))
        .route("/permissions/list", get(user::permission_list))
        .route("/organizer/create", post(organizers::create))
        .route("/organizer/dashboard", get(organizers::dashboard))
        .route("/organizer/team/invite/accept", post(team::accept_invite))
        .route("/organizer/:id", get(organizers::get).delete(organizers::delete))
        .route("/organizer/:id/fields", put(organizers::update_fields))
        .route("/organizer/:id/venues", get(organizers::venues))
        .route("/organizer/:id/events", get(organizers::events))
        .route("/organizer/:id/team", get(team::list))
        .route("/organizer/:id/team/invite", post(team::invite))
        .route("/organizer/:id/team/member/:member_id", delete(team::remove_member))
        .route(
            "/organizer/:id/member/:member_id/permissions",
            get(team::member_permissions).put(team::update_member_permission),
        )
        .route("/venue/create", post(venues::create))
        .route("/venue/:id", get(venues::get).delete(venues::delete))
        .route("/venue/:id/fields", put(venues::update_fields))
        .route("/space/create", post(spaces::create))
        .route("/space/:id", get(spaces::get).delete(spaces::delete))
        .route("/space/:id/fields", put(spaces::update_fields))
        .route("/event/create", post(events::create))
        .route("/event/:id", get(events::get).delete(events::delete))
        .route("/event/:id/fields", put(events::update_fields))
        .route("/event/:id/release-status", put(events::update_release_status))
        .route("/event/:id/date", post(event_dates::create))
        .route(
            "/event/:id/date/:date_id",
            put(event_dates::update).delete(event_dates::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/activate", post(auth::activate))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .route("/events", get(events::public_list))
        .route("/event/:event_id/date/:date_id", get(events::public_date_detail))
        .route("/venues", get(venues::public_list))
        .route("/geojson/venues", get(venues::public_geojson))
        .route("/organizers", get(organizers::public_search))
        .route("/organizer/:id", get(organizers::public_get))
        .route("/choosable-venue-types", get(lookups::venue_types))
        .route("/choosable-space-types", get(lookups::space_types))
        .route("/choosable-event-types", get(lookups::event_types))
        .route("/choosable-release-states", get(lookups::release_states))
        .route(
            "/choosable-event-genres/event-type/:id",
            get(lookups::genres_of_event_type),
        )
        .route("/event/type-genre-lookup", get(lookups::type_genre_lookup))
        .route("/accessibility/flags", get(lookups::accessibility_flags))
        .route("/choosable-venues/organizer/:id", get(lookups::venues_of_organizer))
        .route("/choosable-spaces/venue/:id", get(lookups::spaces_of_venue))
        .nest("/admin", admin_routes(state))
}

pub fn create_routes(state: AppState) -> Router {
    let production = state.config.production;
    let cors = create_cors_layer(state.config.cors_allowed_origins.as_deref());

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    create_security_headers_layers(router, production).layer(cors)
}
