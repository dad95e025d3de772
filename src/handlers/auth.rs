use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::email::{self, OutgoingEmail};
use crate::auth::jwt::ACTIVATION_TOKEN_TTL_SECS;
use crate::auth::middleware::{auth_cookie, bearer_token};
use crate::auth::{password, TokenKind};
use crate::db;
use crate::models::user::UserProfile;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{created, empty_success, success};
use crate::utils::validate::{is_valid_email, is_valid_iso639_1, validate_password};

const PASSWORD_RESET_TTL_SECS: i64 = 3600;
const INVALID_CREDENTIALS: &str = "Invalid email or password";
const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent";

#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

impl LangQuery {
    /// Requested language, `en` when absent.
    pub fn language(&self) -> AppResult<String> {
        match self.lang.as_deref().map(str::trim) {
            None | Some("") => Ok("en".to_string()),
            Some(lang) if is_valid_iso639_1(lang) => Ok(lang.to_string()),
            Some(lang) => Err(AppError::validation(format!("lang format error: {}", lang))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    token_type: &'static str,
    expires_in: i64,
    user: UserProfile,
}

/// Loads a system template and sends it in the background. A missing
/// template is logged and the email skipped.
pub(super) async fn send_system_email(
    state: &AppState,
    context: &str,
    lang: &str,
    to: &str,
    vars: &[(&str, &str)],
) -> AppResult<()> {
    match db::templates::load(&state.pool, context, lang).await? {
        Some(template) => {
            email::dispatch(
                state.mailer.clone(),
                OutgoingEmail {
                    to: to.to_string(),
                    subject: email::render(&template.subject, vars),
                    html_body: email::render(&template.template, vars),
                },
            );
        }
        None => {
            tracing::warn!(context, lang, "Email template missing, email not sent");
        }
    }
    Ok(())
}

pub async fn signup(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
    Json(payload): Json<CredentialsRequest>,
) -> AppResult<Response> {
    let lang = query.language()?;
    let email_address = payload.email.trim().to_lowercase();
    if !is_valid_email(&email_address) {
        return Err(AppError::validation("invalid email address"));
    }
    validate_password(&payload.password)?;

    let mut tx = state.pool.begin().await?;

    if db::users::find_by_email(&mut *tx, &email_address).await?.is_some() {
        return Err(AppError::Conflict("email already registered".to_string()));
    }

    let hash = password::hash_password(&payload.password)?;
    let user_id = db::users::insert_user(&mut *tx, &email_address, &hash, &lang).await?;
    let token = state.jwt.issue(user_id, TokenKind::Activation)?;
    db::users::set_activate_token(&mut *tx, user_id, &token).await?;

    tx.commit().await?;
    tracing::info!(user_id, "User signed up");

    let link = format!("{}/app/activate/account?token={}", state.config.app_base_url, token);
    let expiry_hours = (ACTIVATION_TOKEN_TTL_SECS / 3600).to_string();
    send_system_email(
        &state,
        "activate-email",
        &lang,
        &email_address,
        &[("link", link.as_str()), ("expiry_hours", expiry_hours.as_str())],
    )
    .await?;

    Ok(created(
        json!({ "user_id": user_id }),
        "Signup successful, please check your email to activate your account",
    ))
}

pub async fn activate(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> AppResult<Response> {
    let claims = state
        .jwt
        .validate(payload.token.trim(), TokenKind::Activation)
        .map_err(|_| AppError::validation("invalid or expired activation token"))?;

    if !db::users::activate(&state.pool, claims.user_id, payload.token.trim()).await? {
        return Err(AppError::validation("invalid or expired activation token"));
    }

    tracing::info!(user_id = claims.user_id, "Account activated");
    Ok(empty_success("Account activated"))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> AppResult<Response> {
    let invalid = || AppError::AuthError(INVALID_CREDENTIALS.to_string());

    let email_address = payload.email.trim();
    if email_address.is_empty() || payload.password.is_empty() {
        return Err(invalid());
    }

    let user = db::users::find_by_email(&state.pool, email_address)
        .await?
        .ok_or_else(invalid)?;

    if !user.is_active || !password::verify_password(&payload.password, &user.password_hash) {
        return Err(invalid());
    }

    let access_token = state.jwt.issue(user.id, TokenKind::Access)?;
    let refresh_token = state.jwt.issue(user.id, TokenKind::Refresh)?;
    let expires_in = state.jwt.ttl(TokenKind::Access).num_seconds();
    let cookie = auth_cookie(&access_token, expires_in, state.config.production);

    tracing::info!(user_id = user.id, "User logged in");

    let mut response = success(
        LoginResponse {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in,
            user: user.into(),
        },
        "Login successful",
    );
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::InternalServerError(format!("invalid cookie value: {}", e)))?;
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::AuthError("refresh token required".to_string()))?;
    let claims = state.jwt.validate(&token, TokenKind::Refresh)?;

    let access_token = state.jwt.issue(claims.user_id, TokenKind::Access)?;
    let expires_in = state.jwt.ttl(TokenKind::Access).num_seconds();
    let bearer = HeaderValue::from_str(&format!("Bearer {}", access_token))
        .map_err(|e| AppError::InternalServerError(format!("invalid header value: {}", e)))?;

    let mut response = success(
        json!({ "access_token": access_token, "expires_in": expires_in }),
        "Token refreshed",
    );
    response.headers_mut().insert(header::AUTHORIZATION, bearer);
    Ok(response)
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Response> {
    let lang = query.language()?;
    let email_address = payload.email.trim();
    if !is_valid_email(email_address) {
        return Ok(empty_success(FORGOT_PASSWORD_MESSAGE));
    }

    let Some(user) = db::users::find_by_email(&state.pool, email_address).await? else {
        return Ok(empty_success(FORGOT_PASSWORD_MESSAGE));
    };

    let token = password::generate_token();
    let expires_at = Utc::now() + Duration::seconds(PASSWORD_RESET_TTL_SECS);
    db::users::insert_password_reset(&state.pool, user.id, &token, expires_at).await?;

    let link = format!("{}/app/reset-password?token={}", state.config.app_base_url, token);
    let expiry_hours = (PASSWORD_RESET_TTL_SECS / 3600).to_string();
    send_system_email(
        &state,
        "reset-email",
        &lang,
        &user.email_address,
        &[("link", link.as_str()), ("expiry_hours", expiry_hours.as_str())],
    )
    .await?;

    Ok(empty_success(FORGOT_PASSWORD_MESSAGE))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Response> {
    validate_password(&payload.new_password)?;

    let mut tx = state.pool.begin().await?;

    let reset = db::users::find_password_reset_for_update(&mut *tx, payload.token.trim())
        .await?
        .filter(|r| r.is_usable(Utc::now()))
        .ok_or_else(|| AppError::validation("invalid or expired reset token"))?;

    let hash = password::hash_password(&payload.new_password)?;
    db::users::update_password(&mut *tx, reset.user_id, &hash).await?;
    db::users::mark_password_reset_used(&mut *tx, reset.id).await?;

    tx.commit().await?;
    tracing::info!(user_id = reset.user_id, "Password reset");

    Ok(empty_success("Password has been reset"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_defaults_and_validation() {
        assert_eq!(LangQuery::default().language().unwrap(), "en");
        let q = LangQuery { lang: Some("de".into()) };
        assert_eq!(q.language().unwrap(), "de");
        let q = LangQuery { lang: Some("german".into()) };
        assert!(q.language().is_err());
    }
}
