//! Signed session tokens.
//!
//! All tokens are HS256 JWTs carrying the user id and a `typ` claim, so an
//! activation or refresh token can never be used where an access token is
//! expected.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::utils::error::{AppError, AppResult};

pub const ACTIVATION_TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
    Activation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtManager {
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::seconds(access_ttl_secs),
            refresh_ttl: Duration::seconds(refresh_ttl_secs),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            config.access_token_ttl_secs,
            config.refresh_token_ttl_secs,
        )
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
            TokenKind::Activation => Duration::seconds(ACTIVATION_TOKEN_TTL_SECS),
        }
    }

    pub fn issue(&self, user_id: i32, kind: TokenKind) -> AppResult<String> {
        self.issue_with_ttl(user_id, kind, self.ttl(kind))
    }

    fn issue_with_ttl(&self, user_id: i32, kind: TokenKind, ttl: Duration) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            typ: kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("token signing failed: {}", e)))
    }

    /// Verifies signature, expiry and token kind.
    pub fn validate(&self, token: &str, expected: TokenKind) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::AuthError("Token expired".to_string()),
                _ => AppError::AuthError("Invalid token".to_string()),
            }
        })?;

        if data.claims.typ != expected {
            return Err(AppError::AuthError("Invalid token type".to_string()));
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> JwtManager {
        JwtManager::new("test_secret_key_for_testing_only", 900, 3600)
    }

    #[test]
    fn test_issue_and_validate() {
        let jwt = manager();
        let token = jwt.issue(42, TokenKind::Access).unwrap();
        let claims = jwt.validate(&token, TokenKind::Access).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.typ, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let jwt = manager();
        let refresh = jwt.issue(1, TokenKind::Refresh).unwrap();
        assert!(jwt.validate(&refresh, TokenKind::Access).is_err());
        assert!(jwt.validate(&refresh, TokenKind::Refresh).is_ok());

        let activation = jwt.issue(1, TokenKind::Activation).unwrap();
        assert!(jwt.validate(&activation, TokenKind::Access).is_err());
    }

    #[test]
    fn test_expired_token() {
        let jwt = manager();
        let token = jwt
            .issue_with_ttl(1, TokenKind::Access, Duration::seconds(-600))
            .unwrap();
        match jwt.validate(&token, TokenKind::Access) {
            Err(AppError::AuthError(msg)) => assert_eq!(msg, "Token expired"),
            other => panic!("expected expiry error, got {:?}", other.map(|c| c.user_id)),
        }
    }

    #[test]
    fn test_foreign_signature() {
        let other = JwtManager::new("another_secret_key_entirely", 900, 3600);
        let token = other.issue(1, TokenKind::Access).unwrap();
        assert!(manager().validate(&token, TokenKind::Access).is_err());
        assert!(manager().validate("not-a-jwt", TokenKind::Access).is_err());
    }

    #[test]
    fn test_token_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TokenKind::Activation).unwrap(),
            "\"activation\""
        );
    }
}
