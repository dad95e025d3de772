use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::jwt::TokenKind;
use crate::state::AppState;
use crate::utils::error::AppError;

pub const AUTH_COOKIE: &str = "uranus_auth_token";

/// The authenticated user of an admin request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i32,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or_else(|| AppError::AuthError("Authentication required".to_string()))
    }
}

/// Rejects requests without a valid access token and records the user for
/// downstream handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(request.headers())
        .ok_or_else(|| AppError::AuthError("Authentication required".to_string()))?;

    let claims = state.jwt.validate(&token, TokenKind::Access)?;
    request.extensions_mut().insert(CurrentUser {
        user_id: claims.user_id,
    });

    Ok(next.run(request).await)
}

/// Cookie first, then `Authorization: Bearer`.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == AUTH_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// `Set-Cookie` value carrying an access token.
pub fn auth_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=None; Max-Age={}",
        AUTH_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request as HttpRequest};

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_cookie_wins_over_bearer() {
        let map = headers(&[
            (header::COOKIE, "theme=dark; uranus_auth_token=from-cookie"),
            (header::AUTHORIZATION, "Bearer from-header"),
        ]);
        assert_eq!(extract_token(&map).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_bearer_fallback() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(extract_token(&map).as_deref(), Some("abc.def.ghi"));

        let map = headers(&[(header::AUTHORIZATION, "Basic dXNlcg==")]);
        assert_eq!(extract_token(&map), None);

        let map = headers(&[(header::COOKIE, "uranus_auth_token=")]);
        assert_eq!(extract_token(&map), None);
    }

    #[test]
    fn test_auth_cookie_flags() {
        let cookie = auth_cookie("t", 3600, false);
        assert_eq!(
            cookie,
            "uranus_auth_token=t; Path=/; HttpOnly; SameSite=None; Max-Age=3600"
        );
        assert!(auth_cookie("t", 3600, true).ends_with("; Secure"));
    }

    #[tokio::test]
    async fn test_current_user_extractor() {
        let mut request = HttpRequest::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(CurrentUser { user_id: 7 });
        let (mut parts, _) = request.into_parts();
        let user = CurrentUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user.user_id, 7);

        let (mut parts, _) = HttpRequest::builder().body(()).unwrap().into_parts();
        assert!(CurrentUser::from_request_parts(&mut parts, &())
            .await
            .is_err());
    }
}
