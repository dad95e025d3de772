use std::env;
use std::str::FromStr;

use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layers;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/uranus";
const DEFAULT_APP_BASE_URL: &str = "http://localhost:5173";
const MIN_JWT_SECRET_LEN: usize = 16;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_schema: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub base_api_url: String,
    pub app_base_url: String,
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    pub production: bool,
    pub cors_allowed_origins: Option<String>,
    pub smtp: Option<SmtpConfig>,
    pub mail_from: String,
    pub mail_from_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = parse_or(&get, "PORT", 3001)?;

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                value: format!("at least {} bytes required", MIN_JWT_SECRET_LEN),
            });
        }

        let smtp = match get("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: parse_or(&get, "SMTP_PORT", 587)?,
                user: get("SMTP_USER"),
                password: get("SMTP_PASSWORD"),
            }),
            None => None,
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            db_schema: get("DB_SCHEMA").unwrap_or_else(|| "public".to_string()),
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 5)?,
            port,
            base_api_url: get("BASE_API_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", port)),
            app_base_url: get("APP_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_APP_BASE_URL.to_string()),
            jwt_secret,
            access_token_ttl_secs: parse_or(&get, "ACCESS_TOKEN_TTL_SECS", 3600)?,
            refresh_token_ttl_secs: parse_or(&get, "REFRESH_TOKEN_TTL_SECS", 604_800)?,
            production: get("RUST_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS"),
            smtp,
            mail_from: get("MAIL_FROM").unwrap_or_else(|| "no-reply@localhost".to_string()),
            mail_from_name: get("MAIL_FROM_NAME").unwrap_or_else(|| "Uranus".to_string()),
        })
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const SECRET: (&str, &str) = ("JWT_SECRET", "0123456789abcdef0123");

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[SECRET])).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.db_schema, "public");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.port, 3001);
        assert_eq!(config.base_api_url, "http://localhost:3001");
        assert_eq!(config.access_token_ttl_secs, 3600);
        assert_eq!(config.refresh_token_ttl_secs, 604_800);
        assert!(!config.production);
        assert!(config.smtp.is_none());
    }

    #[test]
    fn test_missing_or_short_secret() {
        assert_eq!(
            Config::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
        assert!(matches!(
            Config::from_lookup(lookup(&[("JWT_SECRET", "short")])),
            Err(ConfigError::Invalid { name: "JWT_SECRET", .. })
        ));
    }

    #[test]
    fn test_invalid_number_names_variable() {
        let err = Config::from_lookup(lookup(&[SECRET, ("PORT", "eighty")])).unwrap_err();
        assert_eq!(err.to_string(), "PORT has an invalid value: eighty");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            SECRET,
            ("RUST_ENV", "Production"),
            ("APP_BASE_URL", "https://uranus.example/"),
            ("SMTP_HOST", "mail.example"),
            ("SMTP_PORT", "2525"),
            ("DB_SCHEMA", "uranus"),
        ]))
        .unwrap();
        assert!(config.production);
        assert_eq!(config.app_base_url, "https://uranus.example");
        assert_eq!(config.db_schema, "uranus");
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "mail.example");
        assert_eq!(smtp.port, 2525);
    }
}
