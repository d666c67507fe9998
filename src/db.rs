//! Persistence layer
//!
//! `MarketStore` is the seam between the marketplace services and storage.
//! Production runs on PostgreSQL through a deadpool connection pool; tests use
//! an in-memory store with the same uniqueness and cascade rules.

#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod queries;

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::models::{
    Ad, AdChanges, AdCriteria, AdId, ExchangeProposal, NewAd, NewProposal, NewUser, PageRequest,
    ProposalCriteria, ProposalId, ProposalStatus, User, UserId,
};
use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tracing::info;

/// Storage operations needed by the marketplace.
///
/// Lookups return `Ok(None)` for missing rows; the services decide whether
/// that is a `NotFound`. Writes that would break the pair uniqueness of
/// proposals fail with `AppError::Conflict`.
#[async_trait]
pub trait MarketStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, AppError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn insert_ad(&self, owner: UserId, ad: NewAd) -> Result<Ad, AppError>;
    async fn get_ad(&self, id: AdId) -> Result<Option<Ad>, AppError>;
    async fn update_ad(&self, id: AdId, changes: AdChanges) -> Result<Option<Ad>, AppError>;
    /// Deletes the ad and every proposal referencing it. Returns false if absent.
    async fn delete_ad(&self, id: AdId) -> Result<bool, AppError>;
    async fn list_ads(&self, criteria: &AdCriteria, page: PageRequest) -> Result<(Vec<Ad>, u64), AppError>;

    async fn insert_proposal(&self, proposal: NewProposal) -> Result<ExchangeProposal, AppError>;
    async fn get_proposal(&self, id: ProposalId) -> Result<Option<ExchangeProposal>, AppError>;
    /// Moves a still-pending proposal to `status`; `None` if it is absent or already decided.
    async fn decide_proposal(
        &self,
        id: ProposalId,
        status: ProposalStatus,
    ) -> Result<Option<ExchangeProposal>, AppError>;
    async fn list_proposals(
        &self,
        criteria: &ProposalCriteria,
        page: PageRequest,
    ) -> Result<(Vec<ExchangeProposal>, u64), AppError>;
}

/// Create a connection pool, with TLS when the configuration asks for it
pub fn create_pool(config: &DatabaseConfig) -> Result<Pool, AppError> {
    let mut cfg = Config::new();
    cfg.host = Some(config.host.clone());
    cfg.port = Some(config.port);
    cfg.user = Some(config.user.clone());
    cfg.password = Some(config.password.clone());
    cfg.dbname = Some(config.database.clone());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.pool = Some(PoolConfig::new(config.max_pool_size));

    if config.require_tls {
        let certs = rustls_native_certs::load_native_certs();
        let mut root_store = rustls::RootCertStore::empty();
        for cert in certs.certs {
            root_store.add(cert).ok();
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();
        let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

        cfg.create_pool(Some(Runtime::Tokio1), tls)
            .map_err(|e| AppError::Config(format!("Failed to create TLS pool: {}", e)))
    } else {
        cfg.create_pool(Some(Runtime::Tokio1), tokio_postgres::NoTls)
            .map_err(|e| AppError::Config(format!("Failed to create pool: {}", e)))
    }
}

/// Check out one connection and run a trivial query
pub async fn verify_connection(pool: &Pool) -> Result<(), AppError> {
    let client = pool.get().await?;
    client.query_one("SELECT 1", &[]).await?;
    Ok(())
}

/// Create enum types, tables and indexes if they don't exist
pub async fn init_schema(pool: &Pool) -> Result<(), AppError> {
    let client = pool.get().await?;
    client.batch_execute(queries::CREATE_SCHEMA).await?;

    info!("Database schema initialized");
    Ok(())
}
