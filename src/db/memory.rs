//! In-memory market store for tests
//!
//! Mirrors the PostgreSQL schema rules: unique usernames, one proposal per
//! ordered ad pair, cascading deletes and pending-only status updates.

use super::MarketStore;
use crate::error::{conflict_error, not_found_error, AppError};
use crate::models::{
    Ad, AdChanges, AdCriteria, AdId, Condition, ExchangeProposal, NewAd, NewProposal, NewUser,
    PageRequest, ProposalCriteria, ProposalId, ProposalStatus, User, UserId,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    ads: BTreeMap<AdId, Ad>,
    proposals: BTreeMap<ProposalId, ExchangeProposal>,
    last_user_id: UserId,
    last_ad_id: AdId,
    last_proposal_id: ProposalId,
}

/// Thread-safe in-memory store
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user with a throwaway password hash
    pub async fn seed_user(&self, username: &str) -> User {
        self.create_user(NewUser {
            username: username.to_string(),
            email: None,
            password_hash: "!".to_string(),
        })
        .await
        .expect("seed user")
    }

    /// Post a minimal ad owned by `owner`
    pub async fn seed_ad(&self, owner: UserId, title: &str, category: &str, condition: Condition) -> Ad {
        self.insert_ad(
            owner,
            NewAd {
                title: title.to_string(),
                description: format!("{} description", title),
                image_url: None,
                category: category.to_string(),
                condition,
            },
        )
        .await
        .expect("seed ad")
    }

    pub async fn ad_count(&self) -> usize {
        self.tables.read().await.ads.len()
    }

    pub async fn proposal_count(&self) -> usize {
        self.tables.read().await.proposals.len()
    }
}

/// Newest first, highest id breaking ties
fn page_of<T: Clone>(
    mut rows: Vec<T>,
    created: impl Fn(&T) -> (chrono::DateTime<Utc>, i32),
    page: PageRequest,
) -> (Vec<T>, u64) {
    rows.sort_by_key(|row| std::cmp::Reverse(created(row)));
    let total = rows.len() as u64;
    let slice = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    (slice, total)
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(conflict_error("Username already taken"));
        }

        tables.last_user_id += 1;
        let created = User {
            id: tables.last_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn insert_ad(&self, owner: UserId, ad: NewAd) -> Result<Ad, AppError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get(&owner)
            .map(User::summary)
            .ok_or_else(|| not_found_error("Referenced record does not exist"))?;

        tables.last_ad_id += 1;
        let created = Ad {
            id: tables.last_ad_id,
            user,
            title: ad.title,
            description: ad.description,
            image_url: ad.image_url,
            category: ad.category,
            condition: ad.condition,
            created_at: Utc::now(),
        };
        tables.ads.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_ad(&self, id: AdId) -> Result<Option<Ad>, AppError> {
        Ok(self.tables.read().await.ads.get(&id).cloned())
    }

    async fn update_ad(&self, id: AdId, changes: AdChanges) -> Result<Option<Ad>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(ad) = tables.ads.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            ad.title = title;
        }
        if let Some(description) = changes.description {
            ad.description = description;
        }
        if let Some(image_url) = changes.image_url {
            ad.image_url = image_url;
        }
        if let Some(category) = changes.category {
            ad.category = category;
        }
        if let Some(condition) = changes.condition {
            ad.condition = condition;
        }

        Ok(Some(ad.clone()))
    }

    async fn delete_ad(&self, id: AdId) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if tables.ads.remove(&id).is_none() {
            return Ok(false);
        }

        tables
            .proposals
            .retain(|_, p| p.ad_sender != id && p.ad_receiver != id);
        Ok(true)
    }

    async fn list_ads(&self, criteria: &AdCriteria, page: PageRequest) -> Result<(Vec<Ad>, u64), AppError> {
        let tables = self.tables.read().await;
        let matching = tables
            .ads
            .values()
            .filter(|ad| criteria.matches(ad))
            .cloned()
            .collect();
        Ok(page_of(matching, |ad: &Ad| (ad.created_at, ad.id), page))
    }

    async fn insert_proposal(&self, proposal: NewProposal) -> Result<ExchangeProposal, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.ads.contains_key(&proposal.ad_sender)
            || !tables.ads.contains_key(&proposal.ad_receiver)
        {
            return Err(not_found_error("Referenced record does not exist"));
        }
        if tables.proposals.values().any(|p| {
            p.ad_sender == proposal.ad_sender && p.ad_receiver == proposal.ad_receiver
        }) {
            return Err(conflict_error("A proposal between these ads already exists"));
        }

        tables.last_proposal_id += 1;
        let created = ExchangeProposal {
            id: tables.last_proposal_id,
            ad_sender: proposal.ad_sender,
            ad_receiver: proposal.ad_receiver,
            comment: proposal.comment,
            status: ProposalStatus::Pending,
            created_at: Utc::now(),
        };
        tables.proposals.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_proposal(&self, id: ProposalId) -> Result<Option<ExchangeProposal>, AppError> {
        Ok(self.tables.read().await.proposals.get(&id).cloned())
    }

    async fn decide_proposal(
        &self,
        id: ProposalId,
        status: ProposalStatus,
    ) -> Result<Option<ExchangeProposal>, AppError> {
        let mut tables = self.tables.write().await;
        match tables.proposals.get_mut(&id) {
            Some(proposal) if proposal.status == ProposalStatus::Pending => {
                proposal.status = status;
                Ok(Some(proposal.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_proposals(
        &self,
        criteria: &ProposalCriteria,
        page: PageRequest,
    ) -> Result<(Vec<ExchangeProposal>, u64), AppError> {
        let tables = self.tables.read().await;
        let matching = tables
            .proposals
            .values()
            .filter(|p| criteria.matches(p))
            .cloned()
            .collect();
        Ok(page_of(
            matching,
            |p: &ExchangeProposal| (p.created_at, p.id),
            page,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_usernames_are_unique() {
        let store = MemoryStore::new();
        store.seed_user("alice").await;

        let dup = store
            .create_user(NewUser {
                username: "alice".to_string(),
                email: None,
                password_hash: "!".to_string(),
            })
            .await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_proposal_pair_is_unique_per_direction() {
        let store = MemoryStore::new();
        let alice = store.seed_user("alice").await;
        let bob = store.seed_user("bob").await;
        let book = store.seed_ad(alice.id, "Book", "books", Condition::New).await;
        let lamp = store.seed_ad(bob.id, "Lamp", "home", Condition::Used).await;

        let forward = NewProposal {
            ad_sender: book.id,
            ad_receiver: lamp.id,
            comment: String::new(),
        };
        assert_ok!(store.insert_proposal(forward.clone()).await);
        assert_err!(store.insert_proposal(forward).await);

        let reverse = NewProposal {
            ad_sender: lamp.id,
            ad_receiver: book.id,
            comment: String::new(),
        };
        assert_ok!(store.insert_proposal(reverse).await);
        assert_eq!(store.proposal_count().await, 2);
    }

    #[tokio::test]
    async fn test_delete_ad_cascades_to_proposals() {
        let store = MemoryStore::new();
        let alice = store.seed_user("alice").await;
        let bob = store.seed_user("bob").await;
        let book = store.seed_ad(alice.id, "Book", "books", Condition::New).await;
        let lamp = store.seed_ad(bob.id, "Lamp", "home", Condition::Used).await;
        let chair = store.seed_ad(bob.id, "Chair", "home", Condition::Broken).await;

        for receiver in [lamp.id, chair.id] {
            assert_ok!(
                store
                    .insert_proposal(NewProposal {
                        ad_sender: book.id,
                        ad_receiver: receiver,
                        comment: String::new(),
                    })
                    .await
            );
        }

        assert!(store.delete_ad(lamp.id).await.unwrap());
        assert_eq!(store.proposal_count().await, 1);
        assert!(!store.delete_ad(lamp.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_decide_only_once() {
        let store = MemoryStore::new();
        let alice = store.seed_user("alice").await;
        let bob = store.seed_user("bob").await;
        let book = store.seed_ad(alice.id, "Book", "books", Condition::New).await;
        let lamp = store.seed_ad(bob.id, "Lamp", "home", Condition::Used).await;
        let proposal = store
            .insert_proposal(NewProposal {
                ad_sender: book.id,
                ad_receiver: lamp.id,
                comment: String::new(),
            })
            .await
            .unwrap();

        let decided = store
            .decide_proposal(proposal.id, ProposalStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(decided.map(|p| p.status), Some(ProposalStatus::Accepted));

        let again = store
            .decide_proposal(proposal.id, ProposalStatus::Rejected)
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_listing_is_newest_first_and_paged() {
        let store = MemoryStore::new();
        let alice = store.seed_user("alice").await;
        for i in 0..5 {
            store
                .seed_ad(alice.id, &format!("Ad {}", i), "misc", Condition::Used)
                .await;
        }

        let (ads, total) = store
            .list_ads(&AdCriteria::default(), PageRequest { page: 1, page_size: 2 })
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(ads.iter().map(|a| a.id).collect::<Vec<_>>(), vec![5, 4]);

        let (ads, _) = store
            .list_ads(&AdCriteria::default(), PageRequest { page: 3, page_size: 2 })
            .await
            .unwrap();
        assert_eq!(ads.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1]);
    }
}
