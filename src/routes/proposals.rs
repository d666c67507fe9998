//! Exchange proposal route handlers

use crate::auth::CurrentUser;
use crate::error::{ApiResult, AppError};
use crate::models::{
    CreateProposalRequest, ExchangeProposal, Page, ProposalFilter, ProposalId, SuccessResponse,
    UpdateStatusRequest,
};
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use tracing::debug;

/// GET /api/proposals?status=&ad_sender=&ad_receiver=&page=&page_size=
pub async fn list_proposals(
    State(state): State<SharedState>,
    WithRejection(Query(filter), _): WithRejection<Query<ProposalFilter>, AppError>,
) -> ApiResult<Json<SuccessResponse<Page<ExchangeProposal>>>> {
    let page = state.proposals.list(&filter).await?;

    Ok(Json(SuccessResponse::with_data(
        format!("{} proposals found.", page.count),
        page,
    )))
}

/// POST /api/proposals
pub async fn create_proposal(
    State(state): State<SharedState>,
    user: CurrentUser,
    WithRejection(Json(payload), _): WithRejection<Json<CreateProposalRequest>, AppError>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<ExchangeProposal>>)> {
    debug!(
        "User {} proposing {} -> {}",
        user.id, payload.ad_sender, payload.ad_receiver
    );

    let proposal = state.proposals.create(user.id, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data("Proposal created successfully.", proposal)),
    ))
}

/// PUT /api/proposals/{id}/update
///
/// Accept or reject a pending proposal.
pub async fn update_status(
    State(state): State<SharedState>,
    user: CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<ProposalId>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateStatusRequest>, AppError>,
) -> ApiResult<Json<SuccessResponse<ExchangeProposal>>> {
    let proposal = state
        .proposals
        .update_status(user.id, id, payload.status)
        .await?;

    Ok(Json(SuccessResponse::with_data(
        "Proposal status updated successfully.",
        proposal,
    )))
}
