//! Ad service
//!
//! Anyone may read ads; only the owner may change or remove one.

use super::{find_ad, guard};
use crate::config::PaginationConfig;
use crate::db::MarketStore;
use crate::error::{not_found_error, AppError};
use crate::models::{
    Ad, AdChanges, AdFilter, AdId, CreateAdRequest, Page, PageRequest, ReplaceAdRequest,
    UpdateAdRequest, UserId,
};
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

pub struct AdService {
    store: Arc<dyn MarketStore>,
    pagination: PaginationConfig,
}

impl AdService {
    pub fn new(store: Arc<dyn MarketStore>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }

    /// Post a new ad; the caller becomes its permanent owner
    pub async fn create(&self, actor: UserId, req: CreateAdRequest) -> Result<Ad, AppError> {
        let req = req.normalized();
        req.validate()?;

        let ad = self.store.insert_ad(actor, req.into_new_ad()).await?;
        info!("Ad created: {} (id: {}, owner: {})", ad.title, ad.id, actor);
        Ok(ad)
    }

    pub async fn get(&self, id: AdId) -> Result<Ad, AppError> {
        find_ad(self.store.as_ref(), id).await
    }

    pub async fn list(&self, filter: &AdFilter) -> Result<Page<Ad>, AppError> {
        let page = PageRequest::resolve(filter.page, filter.page_size, &self.pagination)?;
        let criteria = filter.criteria();
        debug!("Listing ads: {:?} {:?}", criteria, page);

        let (ads, total) = self.store.list_ads(&criteria, page).await?;
        Page::new(ads, total, page)
    }

    /// Replace the required fields (PUT); omitted optional fields are kept
    pub async fn replace(&self, actor: UserId, id: AdId, req: ReplaceAdRequest) -> Result<Ad, AppError> {
        let ad = self.get(id).await?;
        guard::ensure_ad_owner(actor, &ad)?;
        let req = req.normalized();
        req.validate()?;

        self.apply(id, req.into_changes()).await
    }

    /// Partial update of the editable fields (PATCH)
    pub async fn update(&self, actor: UserId, id: AdId, req: UpdateAdRequest) -> Result<Ad, AppError> {
        let ad = self.get(id).await?;
        guard::ensure_ad_owner(actor, &ad)?;
        let req = req.normalized();
        req.validate()?;

        self.apply(id, req.into_changes()).await
    }

    pub async fn delete(&self, actor: UserId, id: AdId) -> Result<(), AppError> {
        let ad = self.get(id).await?;
        guard::ensure_ad_owner(actor, &ad)?;

        if !self.store.delete_ad(id).await? {
            return Err(not_found_error(format!("Ad {} not found", id)));
        }

        info!("Ad deleted: {} (id: {})", ad.title, id);
        Ok(())
    }

    async fn apply(&self, id: AdId, changes: AdChanges) -> Result<Ad, AppError> {
        let ad = self
            .store
            .update_ad(id, changes)
            .await?
            .ok_or_else(|| not_found_error(format!("Ad {} not found", id)))?;

        info!("Ad updated: {} (id: {})", ad.title, ad.id);
        Ok(ad)
    }
}
