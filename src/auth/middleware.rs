//! Authentication middleware
//!
//! Extracts and validates JWT tokens from requests. Reads stay anonymous;
//! handlers that mutate state demand a [`CurrentUser`].

use crate::auth::{decode_token, TokenType};
use crate::error::AppError;
use crate::models::UserId;
use crate::state::SharedState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use tracing::debug;

/// The authenticated caller of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
}

/// Attach the caller's identity when a bearer token is presented.
///
/// Requests without an `Authorization` header pass through anonymously; a
/// header that is malformed, expired or not an access token is rejected.
pub async fn identity_middleware(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.headers().contains_key(AUTHORIZATION) {
        let bearer = request
            .headers()
            .typed_get::<Authorization<Bearer>>()
            .ok_or_else(|| AppError::Unauthorized("Invalid authorization format".to_string()))?;

        let claims = decode_token(bearer.token(), &state.auth)?;
        if claims.token_type != TokenType::Access {
            return Err(AppError::Unauthorized("Access token required".to_string()));
        }

        debug!("Authenticated request for user {}", claims.sub);
        request.extensions_mut().insert(CurrentUser {
            id: claims.sub,
            username: claims.username,
        });
    }

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| {
                AppError::Unauthorized("Authentication credentials were not provided".to_string())
            })
    }
}
