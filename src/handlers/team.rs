use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::access;
use super::auth::{send_system_email, LangQuery, TokenRequest};
use crate::auth::password::generate_token;
use crate::auth::CurrentUser;
use crate::db;
use crate::models::permission::is_self_protected;
use crate::models::{Permission, Role};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{created, empty_success, success};
use crate::utils::validate::is_valid_email;

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    #[serde(default)]
    pub email: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PermissionBitRequest {
    pub bit: i64,
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
struct MemberPermissions {
    member_id: i32,
    user_id: i32,
    permissions: i64,
    permissions_binary: String,
}

impl MemberPermissions {
    fn new(member_id: i32, user_id: i32, permission: Permission) -> Self {
        Self {
            member_id,
            user_id,
            permissions: permission.to_db(),
            permissions_binary: permission.binary(),
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(organizer_id): Path<i32>,
) -> AppResult<Response> {
    let mut conn = state.pool.acquire().await?;
    access::organizer(
        &mut conn,
        user.user_id,
        organizer_id,
        Permission::MANAGE_TEAM | Permission::MANAGE_PERMISSIONS,
    )
    .await?;

    let members = db::organizers::team(&mut *conn, organizer_id).await?;
    Ok(success(members, "Team retrieved"))
}

pub async fn invite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(organizer_id): Path<i32>,
    Query(query): Query<LangQuery>,
    Json(payload): Json<InviteRequest>,
) -> AppResult<Response> {
    let lang = query.language()?;
    let email_address = payload.email.trim();
    if !is_valid_email(email_address) {
        return Err(AppError::validation("invalid email address"));
    }
    let role: Role = match payload.role.as_deref() {
        Some(name) => name.parse().map_err(AppError::ValidationError)?,
        None => Role::Assistant,
    };

    let mut tx = state.pool.begin().await?;
    access::organizer(&mut tx, user.user_id, organizer_id, Permission::MANAGE_TEAM).await?;

    let organizer = db::organizers::get(&mut *tx, organizer_id)
        .await?
        .ok_or_else(|| AppError::not_found("organizer not found"))?;
    let invitee = db::users::find_by_email(&mut *tx, email_address)
        .await?
        .ok_or_else(|| AppError::not_found("no user with this email address"))?;
    if db::organizers::is_member(&mut *tx, organizer_id, invitee.id).await? {
        return Err(AppError::Conflict("user is already a team member".to_string()));
    }

    let token = generate_token();
    let member_id = db::organizers::insert_invite(
        &mut *tx,
        organizer_id,
        invitee.id,
        user.user_id,
        &token,
        role.permissions(),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(organizer_id, member_id, invited_by = user.user_id, "Team member invited");

    let link = format!("{}/app/admin/invite/accept?token={}", state.config.app_base_url, token);
    send_system_email(
        &state,
        "team-invite",
        &lang,
        &invitee.email_address,
        &[("link", link.as_str()), ("organizer", organizer.name.as_str())],
    )
    .await?;

    Ok(created(json!({ "member_id": member_id }), "Invitation sent"))
}

pub async fn accept_invite(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<TokenRequest>,
) -> AppResult<Response> {
    let mut tx = state.pool.begin().await?;

    let invite = db::organizers::find_invite_for_update(&mut *tx, payload.token.trim())
        .await?
        .ok_or_else(|| AppError::not_found("invitation not found"))?;
    if invite.user_id != user.user_id {
        return Err(AppError::Forbidden("invitation belongs to another user".to_string()));
    }
    if invite.has_joined {
        return Err(AppError::Conflict("invitation already accepted".to_string()));
    }

    db::organizers::upsert_user_link(
        &mut *tx,
        user.user_id,
        invite.organizer_id,
        Permission::from_db(invite.pending_permissions),
    )
    .await?;
    db::organizers::mark_joined(&mut *tx, invite.id).await?;
    tx.commit().await?;

    tracing::info!(organizer_id = invite.organizer_id, user_id = user.user_id, "Invitation accepted");
    Ok(success(json!({ "organizer_id": invite.organizer_id }), "Invitation accepted"))
}

pub async fn remove_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((organizer_id, member_id)): Path<(i32, i32)>,
) -> AppResult<Response> {
    let mut tx = state.pool.begin().await?;
    access::organizer(&mut tx, user.user_id, organizer_id, Permission::MANAGE_TEAM).await?;

    let member = db::organizers::member(&mut *tx, organizer_id, member_id)
        .await?
        .ok_or_else(|| AppError::not_found("member not found"))?;
    if member.user_id == user.user_id {
        return Err(AppError::Forbidden("you cannot remove yourself".to_string()));
    }

    db::organizers::delete_member(&mut *tx, member.id).await?;
    db::organizers::delete_user_link(&mut *tx, member.user_id, organizer_id).await?;
    tx.commit().await?;

    tracing::info!(organizer_id, member_id, removed_by = user.user_id, "Team member removed");
    Ok(empty_success("Member removed"))
}

pub async fn member_permissions(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((organizer_id, member_id)): Path<(i32, i32)>,
) -> AppResult<Response> {
    let mut conn = state.pool.acquire().await?;
    access::organizer(&mut conn, user.user_id, organizer_id, Permission::MANAGE_PERMISSIONS).await?;

    let member = db::organizers::member(&mut *conn, organizer_id, member_id)
        .await?
        .ok_or_else(|| AppError::not_found("member not found"))?;
    let permission = db::permissions::organizer_permission(&mut *conn, member.user_id, organizer_id)
        .await?
        .unwrap_or(Permission::NONE);

    Ok(success(
        MemberPermissions::new(member.id, member.user_id, permission),
        "Permissions retrieved",
    ))
}

pub async fn update_member_permission(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((organizer_id, member_id)): Path<(i32, i32)>,
    Json(payload): Json<PermissionBitRequest>,
) -> AppResult<Response> {
    let bit = u32::try_from(payload.bit)
        .ok()
        .filter(|b| *b <= 63)
        .ok_or_else(|| AppError::validation("bit must be between 0 and 63"))?;

    let mut tx = state.pool.begin().await?;
    access::organizer(&mut tx, user.user_id, organizer_id, Permission::MANAGE_PERMISSIONS).await?;

    let member = db::organizers::member(&mut *tx, organizer_id, member_id)
        .await?
        .ok_or_else(|| AppError::not_found("member not found"))?;
    if member.user_id == user.user_id && is_self_protected(bit) {
        return Err(AppError::Forbidden(
            "you cannot change your own team or permission management rights".to_string(),
        ));
    }

    let mask = db::organizers::update_permission_bit(
        &mut *tx,
        member.user_id,
        organizer_id,
        bit as i32,
        payload.enabled,
    )
    .await?
    .ok_or_else(|| AppError::not_found("member has not joined the team"))?;
    tx.commit().await?;

    tracing::info!(
        organizer_id,
        member_id,
        bit,
        enabled = payload.enabled,
        changed_by = user.user_id,
        "Member permission updated"
    );
    Ok(success(
        MemberPermissions::new(member.id, member.user_id, Permission::from_db(mask)),
        "Permission updated",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_permissions_binary() {
        let body = MemberPermissions::new(3, 9, Permission::EDIT_ORGANIZER | Permission::MANAGE_TEAM);
        assert_eq!(body.permissions, 0b1000001);
        assert_eq!(body.permissions_binary.len(), 64);
        assert!(body.permissions_binary.ends_with("1000001"));
    }
}
