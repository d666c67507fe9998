//! Marketplace core
//!
//! Services that combine the ownership and transition guards with the store.
//! Handlers stay thin: extract, call a service, wrap the result.

mod accounts;
mod ads;
pub mod guard;
mod proposals;

pub use accounts::AccountService;
pub use ads::AdService;
pub use proposals::ProposalService;

use crate::db::MarketStore;
use crate::error::{not_found_error, AppError};
use crate::models::{Ad, AdId};

async fn find_ad(store: &dyn MarketStore, id: AdId) -> Result<Ad, AppError> {
    store
        .get_ad(id)
        .await?
        .ok_or_else(|| not_found_error(format!("Ad {} not found", id)))
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::config::AuthConfig;

    /// Fast bcrypt and a fixed secret so tokens can be minted in tests
    pub fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 7,
            bcrypt_cost: 4,
        }
    }
}
