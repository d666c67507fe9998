//! PostgreSQL-backed market store

use super::{queries, MarketStore};
use crate::error::{conflict_error, not_found_error, AppError};
use crate::models::{
    Ad, AdChanges, AdCriteria, AdId, ExchangeProposal, NewAd, NewProposal, NewUser, PageRequest,
    ProposalCriteria, ProposalId, ProposalStatus, User, UserId, UserSummary,
};
use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;
use tokio_postgres::Row;
use tracing::debug;

/// Market store over a deadpool connection pool
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &Row) -> Result<User, AppError> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

fn ad_from_row(row: &Row) -> Result<Ad, AppError> {
    Ok(Ad {
        id: row.try_get("id")?,
        user: UserSummary {
            id: row.try_get("user_id")?,
            username: row.try_get("username")?,
        },
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        image_url: row.try_get("image_url")?,
        category: row.try_get("category")?,
        condition: row.try_get("condition")?,
        created_at: row.try_get("created_at")?,
    })
}

fn proposal_from_row(row: &Row) -> Result<ExchangeProposal, AppError> {
    Ok(ExchangeProposal {
        id: row.try_get("id")?,
        ad_sender: row.try_get("ad_sender")?,
        ad_receiver: row.try_get("ad_receiver")?,
        comment: row.try_get("comment")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Translate constraint violations into domain errors
fn map_write_error(e: tokio_postgres::Error, conflict: &str) -> AppError {
    match e.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => conflict_error(conflict),
        Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => {
            not_found_error("Referenced record does not exist")
        }
        _ => AppError::Database(e),
    }
}

fn count_from_row(row: &Row) -> Result<u64, AppError> {
    let count: i64 = row.try_get(0)?;
    Ok(u64::try_from(count).unwrap_or_default())
}

#[async_trait]
impl MarketStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                queries::INSERT_USER,
                &[&user.username, &user.email, &user.password_hash],
            )
            .await
            .map_err(|e| map_write_error(e, "Username already taken"))?;

        user_from_row(&row)
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        let client = self.pool.get().await?;
        let row = client.query_opt(queries::GET_USER_BY_ID, &[&id]).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(queries::GET_USER_BY_USERNAME, &[&username])
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert_ad(&self, owner: UserId, ad: NewAd) -> Result<Ad, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                queries::INSERT_AD,
                &[
                    &owner,
                    &ad.title,
                    &ad.description,
                    &ad.image_url,
                    &ad.category,
                    &ad.condition,
                ],
            )
            .await
            .map_err(|e| map_write_error(e, "Ad already exists"))?;

        ad_from_row(&row)
    }

    async fn get_ad(&self, id: AdId) -> Result<Option<Ad>, AppError> {
        let client = self.pool.get().await?;
        let row = client.query_opt(queries::GET_AD, &[&id]).await?;
        row.as_ref().map(ad_from_row).transpose()
    }

    async fn update_ad(&self, id: AdId, changes: AdChanges) -> Result<Option<Ad>, AppError> {
        let client = self.pool.get().await?;
        let replace_image = changes.image_url.is_some();
        let image_url = changes.image_url.flatten();

        let row = client
            .query_opt(
                queries::UPDATE_AD,
                &[
                    &id,
                    &changes.title,
                    &changes.description,
                    &replace_image,
                    &image_url,
                    &changes.category,
                    &changes.condition,
                ],
            )
            .await?;

        row.as_ref().map(ad_from_row).transpose()
    }

    async fn delete_ad(&self, id: AdId) -> Result<bool, AppError> {
        let client = self.pool.get().await?;
        let deleted = client.execute(queries::DELETE_AD, &[&id]).await?;
        Ok(deleted > 0)
    }

    async fn list_ads(&self, criteria: &AdCriteria, page: PageRequest) -> Result<(Vec<Ad>, u64), AppError> {
        let client = self.pool.get().await?;
        let limit = page.limit();
        let offset = page.offset();

        let count_row = client
            .query_one(
                queries::COUNT_ADS,
                &[&criteria.category, &criteria.condition, &criteria.terms],
            )
            .await?;
        let total = count_from_row(&count_row)?;

        let rows = client
            .query(
                queries::LIST_ADS,
                &[
                    &criteria.category,
                    &criteria.condition,
                    &criteria.terms,
                    &limit,
                    &offset,
                ],
            )
            .await?;

        debug!("Fetched {} of {} matching ads", rows.len(), total);
        let ads = rows.iter().map(ad_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok((ads, total))
    }

    async fn insert_proposal(&self, proposal: NewProposal) -> Result<ExchangeProposal, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                queries::INSERT_PROPOSAL,
                &[&proposal.ad_sender, &proposal.ad_receiver, &proposal.comment],
            )
            .await
            .map_err(|e| {
                map_write_error(e, "A proposal between these ads already exists")
            })?;

        proposal_from_row(&row)
    }

    async fn get_proposal(&self, id: ProposalId) -> Result<Option<ExchangeProposal>, AppError> {
        let client = self.pool.get().await?;
        let row = client.query_opt(queries::GET_PROPOSAL, &[&id]).await?;
        row.as_ref().map(proposal_from_row).transpose()
    }

    async fn decide_proposal(
        &self,
        id: ProposalId,
        status: ProposalStatus,
    ) -> Result<Option<ExchangeProposal>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(queries::DECIDE_PROPOSAL, &[&id, &status])
            .await?;
        row.as_ref().map(proposal_from_row).transpose()
    }

    async fn list_proposals(
        &self,
        criteria: &ProposalCriteria,
        page: PageRequest,
    ) -> Result<(Vec<ExchangeProposal>, u64), AppError> {
        let client = self.pool.get().await?;
        let limit = page.limit();
        let offset = page.offset();

        let count_row = client
            .query_one(
                queries::COUNT_PROPOSALS,
                &[&criteria.status, &criteria.ad_sender, &criteria.ad_receiver],
            )
            .await?;
        let total = count_from_row(&count_row)?;

        let rows = client
            .query(
                queries::LIST_PROPOSALS,
                &[
                    &criteria.status,
                    &criteria.ad_sender,
                    &criteria.ad_receiver,
                    &limit,
                    &offset,
                ],
            )
            .await?;

        debug!("Fetched {} of {} matching proposals", rows.len(), total);
        let proposals = rows
            .iter()
            .map(proposal_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((proposals, total))
    }
}
