//! Permission checks shared by the admin handlers.
//!
//! Each check resolves the organizer owning the target entity, then compares
//! the caller's mask against the required bits. Unknown entities are 404,
//! missing links or bits are 403.

use serde::Deserialize;
use sqlx::PgConnection;

use crate::auth::password;
use crate::db;
use crate::models::Permission;
use crate::utils::error::{AppError, AppResult};

/// Body of deletes that must be confirmed with the caller's password.
#[derive(Debug, Default, Deserialize)]
pub struct PasswordConfirmation {
    #[serde(default)]
    pub password: String,
}

impl PasswordConfirmation {
    pub fn password(&self) -> AppResult<&str> {
        if self.password.is_empty() {
            return Err(AppError::validation("password is required"));
        }
        Ok(&self.password)
    }
}

/// Checks `password` against the caller's stored hash. Mismatch is 401.
pub async fn confirm_password(
    conn: &mut PgConnection,
    user_id: i32,
    password: &str,
) -> AppResult<()> {
    let user = db::users::find_by_id(&mut *conn, user_id)
        .await?
        .ok_or_else(|| AppError::AuthError("User not found".to_string()))?;
    if !password::verify_password(password, &user.password_hash) {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }
    Ok(())
}

/// Requires at least one bit of `required` on the organizer. `Permission::NONE`
/// only requires a link.
pub async fn organizer(
    conn: &mut PgConnection,
    user_id: i32,
    organizer_id: i32,
    required: Permission,
) -> AppResult<Permission> {
    let permission = db::permissions::organizer_permission(&mut *conn, user_id, organizer_id)
        .await?
        .ok_or_else(AppError::insufficient_permissions)?;

    if required != Permission::NONE && !permission.has_any(required) {
        return Err(AppError::insufficient_permissions());
    }
    Ok(permission)
}

/// Returns the venue's organizer id.
pub async fn venue(
    conn: &mut PgConnection,
    user_id: i32,
    venue_id: i32,
    required: Permission,
) -> AppResult<i32> {
    let organizer_id = db::permissions::venue_organizer(&mut *conn, venue_id)
        .await?
        .ok_or_else(|| AppError::not_found("venue not found"))?;
    organizer(conn, user_id, organizer_id, required).await?;
    Ok(organizer_id)
}

/// Returns `(venue_id, organizer_id)` of the space.
pub async fn space(
    conn: &mut PgConnection,
    user_id: i32,
    space_id: i32,
    required: Permission,
) -> AppResult<(i32, i32)> {
    let owner = db::permissions::space_owner(&mut *conn, space_id)
        .await?
        .ok_or_else(|| AppError::not_found("space not found"))?;
    organizer(conn, user_id, owner.1, required).await?;
    Ok(owner)
}

/// Returns the event's organizer id.
pub async fn event(
    conn: &mut PgConnection,
    user_id: i32,
    event_id: i32,
    required: Permission,
) -> AppResult<i32> {
    let organizer_id = db::permissions::event_organizer(&mut *conn, event_id)
        .await?
        .ok_or_else(|| AppError::not_found("event not found"))?;
    organizer(conn, user_id, organizer_id, required).await?;
    Ok(organizer_id)
}

/// A venue/space pair is valid when the space belongs to the venue and the
/// venue is either owned by `organizer_id` or choosable by the user.
pub async fn location(
    conn: &mut PgConnection,
    user_id: i32,
    organizer_id: i32,
    venue_id: Option<i32>,
    space_id: Option<i32>,
) -> AppResult<()> {
    if let Some(venue_id) = venue_id {
        let owner = db::permissions::venue_organizer(&mut *conn, venue_id)
            .await?
            .ok_or_else(|| AppError::validation(format!("venue {} does not exist", venue_id)))?;
        if owner != organizer_id {
            organizer(&mut *conn, user_id, owner, Permission::CHOOSE_VENUE).await?;
        }
    }

    match (venue_id, space_id) {
        (None, Some(_)) => Err(AppError::validation("space_id requires venue_id")),
        (Some(venue_id), Some(space_id)) => {
            if db::permissions::is_space_in_venue(&mut *conn, space_id, venue_id).await? {
                Ok(())
            } else {
                Err(AppError::validation(format!(
                    "space {} is not part of venue {}",
                    space_id, venue_id
                )))
            }
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_confirmation_required() {
        let body: PasswordConfirmation = serde_json::from_str("{}").unwrap();
        assert!(matches!(body.password(), Err(AppError::ValidationError(_))));

        let body: PasswordConfirmation =
            serde_json::from_str(r#"{"password": "correct horse"}"#).unwrap();
        assert_eq!(body.password().unwrap(), "correct horse");
    }
}
