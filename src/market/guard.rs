//! Ownership and status-transition rules
//!
//! Pure checks over identities and current state. They never touch the
//! store; the services call them between the read and the write.

use crate::error::{forbidden_error, validation_error, AppError};
use crate::models::{Ad, ProposalStatus, UserId};

/// Only the owner of an ad may update or delete it
pub fn ensure_ad_owner(actor: UserId, ad: &Ad) -> Result<(), AppError> {
    if ad.owner_id() != actor {
        return Err(forbidden_error("You are not the owner of this ad"));
    }
    Ok(())
}

/// Only the owner of the sender ad may propose an exchange from it
pub fn ensure_can_propose(actor: UserId, sender_ad: &Ad) -> Result<(), AppError> {
    if sender_ad.owner_id() != actor {
        return Err(forbidden_error("You are not the owner of the sender ad"));
    }
    Ok(())
}

/// Owners of the two ads a proposal connects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parties {
    pub sender: UserId,
    pub receiver: UserId,
}

/// Decide whether `actor` may move a proposal from `current` to `requested`.
///
/// `pending` is never a valid target. Either party may reject a pending
/// proposal; only the receiver may accept it. Decided proposals are final.
/// When one user owns both ads they act as the sender.
pub fn authorize_transition(
    current: ProposalStatus,
    actor: UserId,
    parties: Parties,
    requested: ProposalStatus,
) -> Result<ProposalStatus, AppError> {
    if requested == ProposalStatus::Pending {
        return Err(validation_error("Invalid status value: pending cannot be set"));
    }

    if actor != parties.sender && actor != parties.receiver {
        return Err(forbidden_error("You are not a party to this proposal"));
    }

    if current.is_terminal() {
        return Err(forbidden_error(format!("Proposal has already been {}", current)));
    }

    if actor == parties.sender && requested != ProposalStatus::Rejected {
        return Err(forbidden_error("The sender may only reject a proposal"));
    }

    Ok(requested)
}
