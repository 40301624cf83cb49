//! User-visible error taxonomy.
//!
//! Every expected failure of a flow is a variant here; the event router
//! turns each into a terminal user-facing message. Unexpected faults are
//! collapsed into [`BotError::Internal`] at the same boundary and reported
//! to the operator log only.

use thiserror::Error;

use crate::gateway::types::{AccountId, GatewayError};
use crate::store::StoreError;
use crate::token::DecodeError;

/// Outcome vocabulary shared by the handshake and purchase flows.
#[derive(Debug, Error)]
pub enum BotError {
    /// The requester has no link record.
    #[error("requester is not linked to any ledger account")]
    NotLinked,

    /// The responder already has a link record.
    #[error("chat identity is already linked")]
    AlreadyLinked,

    /// The target account is already controlled by another identity.
    #[error("account is already linked to another identity")]
    AccountAlreadyLinked,

    /// The responder is already an administrator.
    #[error("identity is already an administrator")]
    AlreadyAdmin,

    /// Promotion without a usable display handle.
    #[error("no display handle available")]
    NoHandle,

    /// The ledger has no account with this id.
    #[error("unknown ledger account {0}")]
    UnknownAccount(AccountId),

    /// No active catalog item matched the selection.
    #[error("no matching drink")]
    UnknownDrink,

    /// The responder dismissed the pending action.
    #[error("action cancelled")]
    Cancelled,

    /// The gateway stayed unreachable past the retry bound, or returned
    /// an undecodable payload.
    #[error("ledger gateway unavailable")]
    UpstreamUnavailable,

    /// A button payload failed to decode.
    #[error("malformed action token")]
    MalformedToken,

    /// Anything the user cannot act on: persistence failures, poisoned
    /// locks. Rendered as a generic notice, logged in full.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BotError {
    /// Stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BotError::NotLinked => "not_linked",
            BotError::AlreadyLinked => "already_linked",
            BotError::AccountAlreadyLinked => "account_already_linked",
            BotError::AlreadyAdmin => "already_admin",
            BotError::NoHandle => "no_handle",
            BotError::UnknownAccount(_) => "unknown_account",
            BotError::UnknownDrink => "unknown_drink",
            BotError::Cancelled => "cancelled",
            BotError::UpstreamUnavailable => "upstream_unavailable",
            BotError::MalformedToken => "malformed_token",
            BotError::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for BotError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AlreadyLinked => BotError::AlreadyLinked,
            StoreError::AccountAlreadyLinked => BotError::AccountAlreadyLinked,
            StoreError::NotLinked => BotError::NotLinked,
            StoreError::AlreadyAdmin => BotError::AlreadyAdmin,
            StoreError::NoHandle => BotError::NoHandle,
            StoreError::Persist(_) | StoreError::Corrupt(_) | StoreError::Poisoned => {
                BotError::Internal(e.to_string())
            }
        }
    }
}

/// All gateway failures look the same to the user; retries already
/// happened inside the client.
impl From<GatewayError> for BotError {
    fn from(_: GatewayError) -> Self {
        BotError::UpstreamUnavailable
    }
}

impl From<DecodeError> for BotError {
    fn from(_: DecodeError) -> Self {
        BotError::MalformedToken
    }
}
