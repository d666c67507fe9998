//! Exchange proposal models

use super::{empty_as_none, AdId, ProposalId};
use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a proposal: `Pending` until the parties decide, then terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[serde(rename_all = "lowercase")]
#[postgres(name = "proposal_status")]
pub enum ProposalStatus {
    #[postgres(name = "pending")]
    Pending,
    #[postgres(name = "accepted")]
    Accepted,
    #[postgres(name = "rejected")]
    Rejected,
}

impl ProposalStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProposalStatus::Accepted | ProposalStatus::Rejected)
    }
}

impl Default for ProposalStatus {
    fn default() -> Self {
        ProposalStatus::Pending
    }
}

impl FromStr for ProposalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProposalStatus::Pending),
            "accepted" => Ok(ProposalStatus::Accepted),
            "rejected" => Ok(ProposalStatus::Rejected),
            other => Err(format!("unknown status `{}`", other)),
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalStatus::Pending => write!(f, "pending"),
            ProposalStatus::Accepted => write!(f, "accepted"),
            ProposalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A directed offer to trade the sender ad for the receiver ad
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeProposal {
    pub id: ProposalId,
    pub ad_sender: AdId,
    pub ad_receiver: AdId,
    pub comment: String,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the proposal store
#[derive(Debug, Clone)]
pub struct NewProposal {
    pub ad_sender: AdId,
    pub ad_receiver: AdId,
    pub comment: String,
}

/// Request to propose an exchange
#[derive(Debug, Deserialize)]
pub struct CreateProposalRequest {
    pub ad_sender: AdId,
    pub ad_receiver: AdId,
    #[serde(default)]
    pub comment: String,
}

impl From<CreateProposalRequest> for NewProposal {
    fn from(req: CreateProposalRequest) -> Self {
        Self {
            ad_sender: req.ad_sender,
            ad_receiver: req.ad_receiver,
            comment: req.comment,
        }
    }
}

/// Request to accept or reject a proposal
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ProposalStatus,
}

/// Query string accepted by the proposal listing; blank values mean "no filter"
#[derive(Debug, Default, Deserialize)]
pub struct ProposalFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<ProposalStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub ad_sender: Option<AdId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub ad_receiver: Option<AdId>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ProposalFilter {
    pub fn criteria(&self) -> ProposalCriteria {
        ProposalCriteria {
            status: self.status,
            ad_sender: self.ad_sender,
            ad_receiver: self.ad_receiver,
        }
    }
}

/// Store-level proposal selection; all present fields must match exactly
#[derive(Debug, Clone, Copy, Default)]
pub struct ProposalCriteria {
    pub status: Option<ProposalStatus>,
    pub ad_sender: Option<AdId>,
    pub ad_receiver: Option<AdId>,
}

impl ProposalCriteria {
    pub fn matches(&self, proposal: &ExchangeProposal) -> bool {
        self.status.map_or(true, |s| s == proposal.status)
            && self.ad_sender.map_or(true, |id| id == proposal.ad_sender)
            && self.ad_receiver.map_or(true, |id| id == proposal.ad_receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        let req: UpdateStatusRequest = serde_json::from_str(r#"{"status":"accepted"}"#).unwrap();
        assert_eq!(req.status, ProposalStatus::Accepted);

        assert!(serde_json::from_str::<UpdateStatusRequest>(r#"{"status":"done"}"#).is_err());
        assert!(serde_json::from_str::<UpdateStatusRequest>(r#"{}"#).is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ProposalStatus::Pending.is_terminal());
        assert!(ProposalStatus::Accepted.is_terminal());
        assert!(ProposalStatus::Rejected.is_terminal());
        assert_eq!(ProposalStatus::default(), ProposalStatus::Pending);
    }

    #[test]
    fn test_create_request_comment_defaults_to_empty() {
        let req: CreateProposalRequest =
            serde_json::from_str(r#"{"ad_sender":1,"ad_receiver":2}"#).unwrap();
        assert_eq!(req.comment, "");
    }

    #[test]
    fn test_blank_filter_values_are_ignored() {
        let filter: ProposalFilter =
            serde_json::from_str(r#"{"status":"","ad_sender":"","ad_receiver":"2"}"#).unwrap();
        assert_eq!(filter.status, None);
        assert_eq!(filter.ad_sender, None);
        assert_eq!(filter.ad_receiver, Some(2));

        assert!(serde_json::from_str::<ProposalFilter>(r#"{"status":"done"}"#).is_err());
        assert!(serde_json::from_str::<ProposalFilter>(r#"{"ad_sender":"abc"}"#).is_err());
    }

    #[test]
    fn test_criteria_matching() {
        let proposal = ExchangeProposal {
            id: 7,
            ad_sender: 1,
            ad_receiver: 2,
            comment: String::new(),
            status: ProposalStatus::Pending,
            created_at: Utc::now(),
        };

        assert!(ProposalCriteria::default().matches(&proposal));
        assert!(ProposalFilter {
            status: Some(ProposalStatus::Pending),
            ad_sender: Some(1),
            ..Default::default()
        }
        .criteria()
        .matches(&proposal));
        assert!(!ProposalFilter {
            status: Some(ProposalStatus::Accepted),
            ..Default::default()
        }
        .criteria()
        .matches(&proposal));
        assert!(!ProposalFilter {
            ad_receiver: Some(1),
            ..Default::default()
        }
        .criteria()
        .matches(&proposal));
    }
}
