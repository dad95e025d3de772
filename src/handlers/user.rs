use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::db;
use crate::models::permission::{catalog, PermissionInfo};
use crate::sql::{Patch, UpdateBuilder};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{empty_success, success};
use crate::utils::validate::is_valid_iso639_1;

const THEMES: [&str; 2] = ["light", "dark"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub display_name: Patch<String>,
    pub first_name: Patch<String>,
    pub last_name: Patch<String>,
    pub locale: Patch<String>,
    pub theme: Patch<String>,
}

#[derive(Debug, Serialize)]
struct ChoosableOrganizer {
    organizer_id: i32,
    organizer_name: String,
    permissions: i64,
    permissions_binary: String,
}

pub async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Response> {
    let profile = db::users::profile(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    Ok(success(profile, "Profile retrieved"))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Response> {
    let mut builder = UpdateBuilder::new();
    builder
        .set_text("display_name", payload.display_name)
        .set_text("first_name", payload.first_name)
        .set_text("last_name", payload.last_name);

    match payload.locale {
        Patch::Absent => {}
        Patch::Value(locale) if is_valid_iso639_1(locale.trim()) => {
            builder.set("locale", Patch::Value(locale.trim().to_string()));
        }
        _ => return Err(AppError::validation("locale must be an ISO 639-1 code")),
    }

    match payload.theme {
        Patch::Absent => {}
        Patch::Value(theme) if THEMES.contains(&theme.trim()) => {
            builder.set("theme", Patch::Value(theme.trim().to_string()));
        }
        _ => return Err(AppError::validation("theme must be one of: light, dark")),
    }

    db::apply_update(&state.pool, builder, "app_user", user.user_id, "user").await?;
    tracing::info!(user_id = user.user_id, "Profile updated");
    Ok(empty_success("Profile updated"))
}

pub async fn choosable_organizers(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Response> {
    let organizers: Vec<ChoosableOrganizer> = db::users::linked_organizers(&state.pool, user.user_id)
        .await?
        .into_iter()
        .map(|o| ChoosableOrganizer {
            permissions_binary: o.permission().binary(),
            organizer_id: o.organizer_id,
            organizer_name: o.organizer_name,
            permissions: o.permissions,
        })
        .collect();
    Ok(success(organizers, "Organizers retrieved"))
}

pub async fn permission_list(_user: CurrentUser) -> AppResult<Response> {
    let permissions: &[PermissionInfo] = catalog();
    Ok(success(permissions, "Permissions retrieved"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_patch_distinguishes_null_and_absent() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"display_name": null, "theme": "dark"}"#).unwrap();
        assert_eq!(req.display_name, Patch::Null);
        assert!(req.first_name.is_absent());
        assert_eq!(req.theme, Patch::Value("dark".to_string()));
    }
}
