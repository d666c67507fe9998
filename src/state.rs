//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::config::{AuthConfig, PaginationConfig};
use crate::db::MarketStore;
use crate::market::{AccountService, AdService, ProposalService};
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Registration, login and token refresh
    pub accounts: AccountService,

    /// Ad listings and owner-only mutation
    pub ads: AdService,

    /// Exchange proposals and their status transitions
    pub proposals: ProposalService,

    /// Token settings, used by the identity middleware
    pub auth: AuthConfig,
}

impl AppState {
    /// Wire every service to one shared store
    pub fn new(store: Arc<dyn MarketStore>, auth: AuthConfig, pagination: PaginationConfig) -> Self {
        Self {
            accounts: AccountService::new(store.clone(), auth.clone()),
            ads: AdService::new(store.clone(), pagination),
            proposals: ProposalService::new(store, pagination),
            auth,
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
