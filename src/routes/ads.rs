//! Ad route handlers
//!
//! Listing and reading are public; create requires a login and
//! update/delete are reserved for the ad's owner.

use crate::auth::CurrentUser;
use crate::error::{ApiResult, AppError};
use crate::models::{
    Ad, AdFilter, AdId, CreateAdRequest, Page, ReplaceAdRequest, SuccessResponse, UpdateAdRequest,
};
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use tracing::debug;

/// GET /api/ads?category=&condition=&search=&page=&page_size=
pub async fn list_ads(
    State(state): State<SharedState>,
    WithRejection(Query(filter), _): WithRejection<Query<AdFilter>, AppError>,
) -> ApiResult<Json<SuccessResponse<Page<Ad>>>> {
    let page = state.ads.list(&filter).await?;

    debug!("Found {} ads", page.count);
    Ok(Json(SuccessResponse::with_data(
        format!("{} ads found.", page.count),
        page,
    )))
}

/// POST /api/ads
pub async fn create_ad(
    State(state): State<SharedState>,
    user: CurrentUser,
    WithRejection(Json(payload), _): WithRejection<Json<CreateAdRequest>, AppError>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<Ad>>)> {
    debug!("Creating ad '{}' for {}", payload.title, user.username);

    let ad = state.ads.create(user.id, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data("Ad created successfully.", ad)),
    ))
}

/// GET /api/ads/{id}
pub async fn get_ad(
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<AdId>, AppError>,
) -> ApiResult<Json<SuccessResponse<Ad>>> {
    let ad = state.ads.get(id).await?;

    Ok(Json(SuccessResponse::with_data("Ad retrieved successfully.", ad)))
}

/// PUT /api/ads/{id}
pub async fn replace_ad(
    State(state): State<SharedState>,
    user: CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<AdId>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<ReplaceAdRequest>, AppError>,
) -> ApiResult<Json<SuccessResponse<Ad>>> {
    let ad = state.ads.replace(user.id, id, payload).await?;

    Ok(Json(SuccessResponse::with_data("Ad updated successfully.", ad)))
}

/// PATCH /api/ads/{id}
pub async fn update_ad(
    State(state): State<SharedState>,
    user: CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<AdId>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateAdRequest>, AppError>,
) -> ApiResult<Json<SuccessResponse<Ad>>> {
    let ad = state.ads.update(user.id, id, payload).await?;

    Ok(Json(SuccessResponse::with_data("Ad updated successfully.", ad)))
}

/// DELETE /api/ads/{id}
pub async fn delete_ad(
    State(state): State<SharedState>,
    user: CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<AdId>, AppError>,
) -> ApiResult<StatusCode> {
    state.ads.delete(user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
