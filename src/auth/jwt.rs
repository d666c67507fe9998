//! JWT token management
//!
//! Handles creation, validation, and refresh of JWT tokens.

use crate::config::AuthConfig;
use crate::error::AppError;
use crate::models::UserId;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: UserId,
    /// Username at issue time
    pub username: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Unique token id
    pub jti: Uuid,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Token pair response
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

fn sign(claims: &Claims, config: &AuthConfig) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign {:?} token: {}", claims.token_type, e)))
}

/// Create access and refresh tokens for a user
pub fn create_tokens(user_id: UserId, username: &str, config: &AuthConfig) -> Result<TokenPair, AppError> {
    let now = Utc::now();

    let access_claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (now + Duration::minutes(config.access_token_ttl_minutes)).timestamp(),
        iat: now.timestamp(),
        jti: Uuid::new_v4(),
        token_type: TokenType::Access,
    };

    let refresh_claims = Claims {
        exp: (now + Duration::days(config.refresh_token_ttl_days)).timestamp(),
        jti: Uuid::new_v4(),
        token_type: TokenType::Refresh,
        ..access_claims.clone()
    };

    Ok(TokenPair {
        access_token: sign(&access_claims, config)?,
        refresh_token: sign(&refresh_claims, config)?,
        token_type: "Bearer".to_string(),
        expires_in: config.access_token_ttl_minutes * 60,
    })
}

/// Decode and validate a JWT token
pub fn decode_token(token: &str, config: &AuthConfig) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token expired".to_string())
        }
        jsonwebtoken::errors::ErrorKind::InvalidToken => {
            AppError::Unauthorized("Invalid token".to_string())
        }
        _ => AppError::Unauthorized(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Decode a refresh token, rejecting access tokens presented in its place
pub fn refresh_claims(refresh_token: &str, config: &AuthConfig) -> Result<Claims, AppError> {
    let claims = decode_token(refresh_token, config)?;

    if claims.token_type != TokenType::Refresh {
        return Err(AppError::Unauthorized("Invalid token type for refresh".to_string()));
    }

    Ok(claims)
}
