//! Exchange proposal service

use super::guard::{self, Parties};
use super::find_ad;
use crate::config::PaginationConfig;
use crate::db::MarketStore;
use crate::error::{forbidden_error, not_found_error, AppError};
use crate::models::{
    CreateProposalRequest, ExchangeProposal, Page, PageRequest, ProposalFilter, ProposalId,
    ProposalStatus, UserId,
};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ProposalService {
    store: Arc<dyn MarketStore>,
    pagination: PaginationConfig,
}

impl ProposalService {
    pub fn new(store: Arc<dyn MarketStore>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }

    /// Propose trading the sender ad for the receiver ad.
    ///
    /// Both ads must exist and the caller must own the sender ad. The store
    /// rejects a second proposal for the same ordered pair.
    pub async fn create(
        &self,
        actor: UserId,
        req: CreateProposalRequest,
    ) -> Result<ExchangeProposal, AppError> {
        let sender_ad = find_ad(self.store.as_ref(), req.ad_sender).await?;
        find_ad(self.store.as_ref(), req.ad_receiver).await?;
        guard::ensure_can_propose(actor, &sender_ad)?;

        let proposal = self.store.insert_proposal(req.into()).await?;
        info!(
            "Proposal created: {} -> {} (id: {})",
            proposal.ad_sender, proposal.ad_receiver, proposal.id
        );
        Ok(proposal)
    }

    pub async fn list(&self, filter: &ProposalFilter) -> Result<Page<ExchangeProposal>, AppError> {
        let page = PageRequest::resolve(filter.page, filter.page_size, &self.pagination)?;
        let criteria = filter.criteria();
        debug!("Listing proposals: {:?} {:?}", criteria, page);

        let (proposals, total) = self.store.list_proposals(&criteria, page).await?;
        Page::new(proposals, total, page)
    }

    /// Accept or reject a pending proposal on behalf of one of its parties
    pub async fn update_status(
        &self,
        actor: UserId,
        id: ProposalId,
        requested: ProposalStatus,
    ) -> Result<ExchangeProposal, AppError> {
        let proposal = self
            .store
            .get_proposal(id)
            .await?
            .ok_or_else(|| not_found_error(format!("Proposal {} not found", id)))?;

        let sender_ad = find_ad(self.store.as_ref(), proposal.ad_sender).await?;
        let receiver_ad = find_ad(self.store.as_ref(), proposal.ad_receiver).await?;
        let parties = Parties {
            sender: sender_ad.owner_id(),
            receiver: receiver_ad.owner_id(),
        };

        let next = guard::authorize_transition(proposal.status, actor, parties, requested)?;

        // Lost a race with another decision on the same proposal
        let decided = self
            .store
            .decide_proposal(id, next)
            .await?
            .ok_or_else(|| forbidden_error("Proposal has already been decided"))?;

        info!("Proposal {} {} by user {}", id, decided.status, actor);
        Ok(decided)
    }
}
