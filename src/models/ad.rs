//! Ad models
//!
//! Listings posted by users, plus the request and filter types around them.

use super::{empty_as_none, AdId, UserId, UserSummary};
use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Physical condition of the advertised item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[serde(rename_all = "lowercase")]
#[postgres(name = "ad_condition")]
pub enum Condition {
    #[postgres(name = "new")]
    New,
    #[postgres(name = "used")]
    Used,
    #[postgres(name = "broken")]
    Broken,
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Condition::New),
            "used" => Ok(Condition::Used),
            "broken" => Ok(Condition::Broken),
            other => Err(format!("unknown condition `{}`", other)),
        }
    }
}

/// A listing offered for exchange
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ad {
    pub id: AdId,
    pub user: UserSummary,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub category: String,
    pub condition: Condition,
    pub created_at: DateTime<Utc>,
}

impl Ad {
    pub fn owner_id(&self) -> UserId {
        self.user.id
    }
}

/// Insert payload for the ad store
#[derive(Debug, Clone)]
pub struct NewAd {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub category: String,
    pub condition: Condition,
}

/// Field changes applied by an update; `None` leaves the field untouched.
///
/// `image_url: Some(None)` clears the image.
#[derive(Debug, Clone, Default)]
pub struct AdChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<Option<String>>,
    pub category: Option<String>,
    pub condition: Option<Condition>,
}

/// Request to create an ad
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAdRequest {
    #[validate(length(min = 1, max = 50, message = "Title must be between 1 and 50 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom(function = "validate_image_url"))]
    #[serde(default)]
    pub image_url: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Category must be between 1 and 50 characters"))]
    pub category: String,
    pub condition: Condition,
}

impl CreateAdRequest {
    /// Strip surrounding whitespace so limits apply to what gets stored
    pub fn normalized(self) -> Self {
        Self {
            title: trimmed(self.title),
            category: trimmed(self.category),
            ..self
        }
    }

    pub fn into_new_ad(self) -> NewAd {
        NewAd {
            title: self.title,
            description: self.description,
            image_url: normalize_image_url(self.image_url),
            category: self.category,
            condition: self.condition,
        }
    }
}

/// Request to replace an ad (PUT).
///
/// Title, category and condition are required. An omitted description or
/// image keeps its stored value; an empty string clears it.
#[derive(Debug, Deserialize, Validate)]
pub struct ReplaceAdRequest {
    #[validate(length(min = 1, max = 50, message = "Title must be between 1 and 50 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(custom(function = "validate_image_url"))]
    pub image_url: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Category must be between 1 and 50 characters"))]
    pub category: String,
    pub condition: Condition,
}

impl ReplaceAdRequest {
    pub fn normalized(self) -> Self {
        Self {
            title: trimmed(self.title),
            category: trimmed(self.category),
            ..self
        }
    }

    pub fn into_changes(self) -> AdChanges {
        AdChanges {
            title: Some(self.title),
            description: self.description,
            image_url: self.image_url.map(|url| normalize_image_url(Some(url))),
            category: Some(self.category),
            condition: Some(self.condition),
        }
    }
}

/// Request to partially update an ad (PATCH)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAdRequest {
    #[validate(length(min = 1, max = 50, message = "Title must be between 1 and 50 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_image_url"))]
    pub image_url: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Category must be between 1 and 50 characters"))]
    pub category: Option<String>,
    pub condition: Option<Condition>,
}

impl UpdateAdRequest {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.map(trimmed),
            category: self.category.map(trimmed),
            ..self
        }
    }

    pub fn into_changes(self) -> AdChanges {
        AdChanges {
            title: self.title,
            description: self.description,
            image_url: self.image_url.map(|url| normalize_image_url(Some(url))),
            category: self.category,
            condition: self.condition,
        }
    }
}

/// Query string accepted by the ad listing; blank values mean "no filter"
#[derive(Debug, Default, Deserialize)]
pub struct AdFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub condition: Option<Condition>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl AdFilter {
    pub fn criteria(&self) -> AdCriteria {
        AdCriteria {
            category: self.category.clone(),
            condition: self.condition,
            terms: self
                .search
                .as_deref()
                .map(search_terms)
                .unwrap_or_default(),
        }
    }
}

/// Store-level ad selection: exact-match fields plus lowercase search terms
#[derive(Debug, Clone, Default)]
pub struct AdCriteria {
    pub category: Option<String>,
    pub condition: Option<Condition>,
    pub terms: Vec<String>,
}

impl AdCriteria {
    /// Every term must occur in the title or the description, ignoring case.
    pub fn matches(&self, ad: &Ad) -> bool {
        if self.category.as_ref().is_some_and(|c| *c != ad.category) {
            return false;
        }
        if self.condition.is_some_and(|c| c != ad.condition) {
            return false;
        }

        let title = ad.title.to_lowercase();
        let description = ad.description.to_lowercase();
        self.terms
            .iter()
            .all(|term| title.contains(term.as_str()) || description.contains(term.as_str()))
    }
}

/// Split a search string on whitespace and commas into lowercase terms
fn search_terms(raw: &str) -> Vec<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

fn normalize_image_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

/// Empty means "no image"; anything else must be an absolute http(s) URL
fn validate_image_url(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }

    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => {
            let mut err = ValidationError::new("invalid_url");
            err.message = Some("Enter a valid URL.".into());
            Err(err)
        }
    }
}
