//! Data models and DTOs (Data Transfer Objects)
//!
//! Contains the marketplace entities and all request/response structures used by the API.

pub mod ad;
pub mod proposal;
pub mod user;

// Re-export commonly used types
pub use ad::*;
pub use proposal::*;
pub use user::*;

use crate::config::PaginationConfig;
use crate::error::{not_found_error, AppError};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of a registered user
pub type UserId = i32;

/// Identity of an ad
pub type AdId = i32;

/// Identity of an exchange proposal
pub type ProposalId = i32;

/// Read an optional value where a blank string means "not given".
///
/// Query strings such as `?status=` arrive as empty strings rather than
/// missing keys; both deserialize to `None`.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Generic success response
#[derive(Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

/// A resolved page window: 1-based page number and clamped page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Resolve raw `page` / `page_size` query values against the configured limits.
    ///
    /// A zero page size falls back to the default; oversized requests are clamped
    /// to the maximum. Page numbers start at 1.
    pub fn resolve(
        page: Option<u32>,
        page_size: Option<u32>,
        limits: &PaginationConfig,
    ) -> Result<Self, AppError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(not_found_error("Invalid page."));
        }

        let page_size = match page_size {
            None | Some(0) => limits.default_page_size,
            Some(size) => size.min(limits.max_page_size),
        };

        Ok(Self { page, page_size })
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

/// One page of a filtered, newest-first listing
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub count: u64,
    pub page: u32,
    pub page_size: u32,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T: Serialize> Page<T> {
    /// Assemble a page from the store's slice and total match count.
    ///
    /// Asking for a page past the end is `NotFound`, except page 1 which is
    /// always valid (an empty listing).
    pub fn new(results: Vec<T>, count: u64, request: PageRequest) -> Result<Self, AppError> {
        let page_size = u64::from(request.page_size);
        let last_page = count.div_ceil(page_size).max(1);
        if u64::from(request.page) > last_page {
            return Err(not_found_error("Invalid page."));
        }

        Ok(Self {
            count,
            page: request.page,
            page_size: request.page_size,
            next: (u64::from(request.page) < last_page).then(|| request.page + 1),
            previous: (request.page > 1).then(|| request.page - 1),
            results,
        })
    }
}
