//! Account service: registration, login and token refresh

use crate::auth::{create_tokens, hash_password, refresh_claims, verify_password, TokenPair};
use crate::config::AuthConfig;
use crate::db::MarketStore;
use crate::error::{not_found_error, AppError};
use crate::models::{
    AccountResponse, AuthResponse, LoginRequest, NewUser, RefreshRequest, RegisterRequest, UserId,
};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

pub struct AccountService {
    store: Arc<dyn MarketStore>,
    auth: AuthConfig,
}

impl AccountService {
    pub fn new(store: Arc<dyn MarketStore>, auth: AuthConfig) -> Self {
        Self { store, auth }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AppError> {
        req.validate()?;

        let password_hash = hash_password(req.password, self.auth.bcrypt_cost).await?;
        let user = self
            .store
            .create_user(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
            })
            .await?;

        info!("User registered: {} (id: {})", user.username, user.id);
        let tokens = create_tokens(user.id, &user.username, &self.auth)?;
        Ok(AuthResponse {
            user: user.summary(),
            tokens,
        })
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AppError> {
        let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

        let user = self
            .store
            .find_user_by_username(&req.username)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(req.password, user.password_hash.clone()).await? {
            warn!("Failed login for user {}", user.username);
            return Err(invalid());
        }

        let tokens = create_tokens(user.id, &user.username, &self.auth)?;
        Ok(AuthResponse {
            user: user.summary(),
            tokens,
        })
    }

    /// Issue a new token pair from a refresh token, if its user still exists
    pub async fn refresh(&self, req: RefreshRequest) -> Result<TokenPair, AppError> {
        let claims = refresh_claims(&req.refresh_token, &self.auth)?;

        let user = self
            .store
            .find_user_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

        create_tokens(user.id, &user.username, &self.auth)
    }

    pub async fn account(&self, id: UserId) -> Result<AccountResponse, AppError> {
        let user = self
            .store
            .find_user_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("User not found"))?;

        Ok(user.into())
    }
}
