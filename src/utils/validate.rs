//! Input validation shared by the JSON payload handlers.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::error::{AppError, AppResult};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});
static ISO_639_1_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2}$").expect("language regex is valid"));
static CURRENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("currency regex is valid"));

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_iso639_1(lang: &str) -> bool {
    ISO_639_1_RE.is_match(lang)
}

pub fn is_valid_currency_code(code: &str) -> bool {
    CURRENCY_RE.is_match(code)
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Trimmed value of a required string field.
pub fn required_text(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

pub fn validate_optional_url(field: &str, value: Option<&str>) -> AppResult<()> {
    let Some(value) = value else {
        return Ok(());
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!(
            "{} cannot be empty if provided",
            field
        )));
    }

    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| {
            AppError::validation(format!("{} must start with http:// or https://", field))
        })?;

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(AppError::validation(format!("{} must be a valid URL", field)));
    }
    Ok(())
}

pub fn parse_date(field: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("{} must be in format YYYY-MM-DD", field)))
}

/// Blank or missing dates are treated as absent.
pub fn parse_optional_date(field: &str, value: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_date(field, v).map(Some),
    }
}

/// Accepts `HH:MM` (24-hour) and `HH:MM:SS`.
pub fn parse_optional_time(field: &str, value: Option<&str>) -> AppResult<Option<NaiveTime>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => NaiveTime::parse_from_str(v, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(v, "%H:%M:%S"))
            .map(Some)
            .map_err(|_| AppError::validation(format!("{} must be in format HH:MM (24-hour)", field))),
    }
}

pub fn validate_languages(languages: &[String]) -> AppResult<()> {
    match languages.iter().find(|l| !is_valid_iso639_1(l)) {
        Some(bad) => Err(AppError::validation(format!(
            "language '{}' is not an ISO 639-1 code",
            bad
        ))),
        None => Ok(()),
    }
}

pub fn validate_min_max<T: PartialOrd>(label: &str, min: Option<T>, max: Option<T>) -> AppResult<()> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(AppError::validation(format!(
                "min_{} must not exceed max_{}",
                label, label
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.org"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("two words@example.com"));
    }

    #[test]
    fn test_language_and_currency() {
        assert!(is_valid_iso639_1("de"));
        assert!(!is_valid_iso639_1("DE"));
        assert!(!is_valid_iso639_1("deu"));
        assert!(is_valid_currency_code("EUR"));
        assert!(!is_valid_currency_code("eur"));
        assert!(validate_languages(&["en".into(), "de".into()]).is_ok());
        assert!(validate_languages(&["en".into(), "german".into()]).is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_url_validation() {
        assert!(validate_optional_url("link", None).is_ok());
        assert!(validate_optional_url("link", Some("https://tickets.example.com/a?b=1")).is_ok());
        assert!(validate_optional_url("link", Some("http://example.com")).is_ok());
        assert!(validate_optional_url("link", Some("   ")).is_err());
        assert!(validate_optional_url("link", Some("ftp://example.com")).is_err());
        assert!(validate_optional_url("link", Some("https://")).is_err());
    }

    #[test]
    fn test_date_and_time_parsing() {
        assert_eq!(
            parse_optional_date("start_date", Some("2025-03-09")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 9)
        );
        assert_eq!(parse_optional_date("start_date", Some(" ")).unwrap(), None);
        assert!(parse_optional_date("start_date", Some("09.03.2025")).is_err());

        assert_eq!(
            parse_optional_time("start_time", Some("19:30")).unwrap(),
            NaiveTime::from_hms_opt(19, 30, 0)
        );
        assert_eq!(
            parse_optional_time("start_time", Some("07:05:10")).unwrap(),
            NaiveTime::from_hms_opt(7, 5, 10)
        );
        assert!(parse_optional_time("start_time", Some("25:00")).is_err());
    }

    #[test]
    fn test_min_max() {
        assert!(validate_min_max("age", Some(6), Some(12)).is_ok());
        assert!(validate_min_max("age", Some(12), Some(6)).is_err());
        assert!(validate_min_max::<i32>("age", None, Some(6)).is_ok());
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("name", "  Kulturhaus ").unwrap(), "Kulturhaus");
        assert!(required_text("name", "   ").is_err());
    }
}
