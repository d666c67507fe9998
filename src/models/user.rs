//! User accounts and authentication DTOs

use super::{empty_as_none, UserId};
use crate::auth::TokenPair;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Letters, digits and `@ . + - _`
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));

/// A registered account
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Public projection of a user, embedded in ads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
}

/// Account details returned to the account holder (never includes the hash)
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for AccountResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Insert payload for the user store
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
}

/// Request to register a new account
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be between 1 and 150 characters"))]
    #[validate(regex(path = *USERNAME_RE, message = "Username may only contain letters, digits and @/./+/-/_"))]
    pub username: String,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,
    #[validate(email(message = "Invalid email address"))]
    #[serde(default, deserialize_with = "empty_as_none")]
    pub email: Option<String>,
}

/// Request to login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request to exchange a refresh token
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Authenticated user plus freshly issued tokens
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserSummary,
    pub tokens: TokenPair,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, password: &str, email: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: email.map(String::from),
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(register("alice", "password123", None).validate().is_ok());
        assert!(register("bob.smith+trade@x", "password123", Some("bob@example.com"))
            .validate()
            .is_ok());

        assert!(register("", "password123", None).validate().is_err());
        assert!(register("has space", "password123", None).validate().is_err());
        assert!(register("alice", "short", None).validate().is_err());
        assert!(register("alice", "password123", Some("not-an-email")).validate().is_err());
    }

    #[test]
    fn test_blank_email_is_no_email() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"username":"alice","password":"password123","email":""}"#)
                .unwrap();
        assert_eq!(req.email, None);
        assert!(req.validate().is_ok());

        let req: RegisterRequest =
            serde_json::from_str(r#"{"username":"alice","password":"password123"}"#).unwrap();
        assert_eq!(req.email, None);
    }
}
