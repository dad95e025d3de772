use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::permission::Permission;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email_address: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub locale: String,
    pub theme: String,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub activate_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub user_id: i32,
    pub email_address: String,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub locale: String,
    pub theme: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            email_address: user.email_address,
            display_name: user.display_name,
            first_name: user.first_name,
            last_name: user.last_name,
            locale: user.locale,
            theme: user.theme,
        }
    }
}

/// An organizer the user is linked to, with the user's mask on it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserOrganizer {
    pub organizer_id: i32,
    pub organizer_name: String,
    pub permissions: i64,
}

impl UserOrganizer {
    pub fn permission(&self) -> Permission {
        Permission::from_db(self.permissions)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PasswordReset {
    pub id: i32,
    pub user_id: i32,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl PasswordReset {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_password_reset_usability() {
        let now = Utc::now();
        let mut reset = PasswordReset {
            id: 1,
            user_id: 2,
            expires_at: now + Duration::minutes(30),
            used: false,
        };
        assert!(reset.is_usable(now));

        reset.used = true;
        assert!(!reset.is_usable(now));

        reset.used = false;
        reset.expires_at = now - Duration::seconds(1);
        assert!(!reset.is_usable(now));
    }

    #[test]
    fn test_secrets_are_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: 1,
            email_address: "a@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            display_name: None,
            first_name: None,
            last_name: None,
            locale: "en".to_string(),
            theme: "light".to_string(),
            is_active: true,
            activate_token: Some("token".to_string()),
            created_at: now,
            modified_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("activate_token").is_none());
    }
}
