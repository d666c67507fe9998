//! Authentication route handlers
//!
//! Provides register, login, refresh and current-user endpoints.

use crate::auth::{CurrentUser, TokenPair};
use crate::error::{ApiResult, AppError};
use crate::models::{
    AccountResponse, AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, SuccessResponse,
};
use crate::state::SharedState;
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use tracing::debug;

/// POST /api/auth/register
///
/// Register a new account and receive JWT tokens.
pub async fn register(
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<AuthResponse>>)> {
    debug!("Registering user: {}", req.username);

    let auth = state.accounts.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data("Account created successfully.", auth)),
    ))
}

/// POST /api/auth/login
///
/// Authenticate with username and password, receive JWT tokens.
pub async fn login(
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, AppError>,
) -> ApiResult<Json<SuccessResponse<AuthResponse>>> {
    let auth = state.accounts.login(req).await?;

    Ok(Json(SuccessResponse::with_data("Logged in successfully.", auth)))
}

/// POST /api/auth/refresh
///
/// Refresh access token using refresh token.
pub async fn refresh(
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<RefreshRequest>, AppError>,
) -> ApiResult<Json<SuccessResponse<TokenPair>>> {
    let tokens = state.accounts.refresh(req).await?;

    Ok(Json(SuccessResponse::with_data("Tokens refreshed.", tokens)))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<SharedState>,
    user: CurrentUser,
) -> ApiResult<Json<SuccessResponse<AccountResponse>>> {
    let account = state.accounts.account(user.id).await?;

    Ok(Json(SuccessResponse::with_data("Current user.", account)))
}
