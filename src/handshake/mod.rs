//! Link/promote confirmation handshake.
//!
//! # Responsibilities
//! - Initiation: an administrator proposes `link <accountId>` or `promote`
//!   through an inline search; the answer carries confirm/cancel buttons
//! - Resolution: any identity may press; the pressed token is re-validated
//!   against the *current* store state, never against the state captured
//!   at initiation
//!
//! # Design Decisions
//! - No per-action state in process memory and no timeout: the message may
//!   be pressed arbitrarily late, so the capability lives entirely in the
//!   button token and resolution re-derives everything it needs
//! - Replays after a successful resolution fall through the same
//!   re-validation and come back as `AlreadyLinked` / `AlreadyAdmin`,
//!   so a stale button can never mutate twice

use crate::error::BotError;
use crate::gateway::types::AccountId;
use crate::gateway::Ledger;
use crate::router::events::Identity;
use crate::router::render::{InlineResult, Keyboard};
use crate::store::LinkStore;
use crate::token::ActionToken;

/// Terminal outcome of a button press: the text the original message is
/// rewritten to, and the transient acknowledgement for the presser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub final_text: String,
    pub ack: String,
}

/// Answer an inline search query from `sender`.
///
/// Returns `Ok(None)` when the query is not a recognized handshake
/// initiation or the sender is not an administrator; the router answers
/// with an empty result list in that case.
pub async fn initiate<L: Ledger>(
    store: &LinkStore,
    ledger: &L,
    sender: &Identity,
    query: &str,
) -> Result<Option<InlineResult>, BotError> {
    if !store.is_admin(sender.platform_id)? {
        return Ok(None);
    }

    let mut words = query.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("link"), Some(raw_id), None) => {
            let Ok(id) = raw_id.parse::<u32>() else {
                return Ok(None);
            };
            initiate_link(store, ledger, AccountId(id)).await.map(Some)
        }
        (Some("promote"), None, None) => Ok(Some(promote_proposal())),
        _ => Ok(None),
    }
}

/// Pre-check against a fresh account fetch, then emit the two-button
/// proposal. An already-linked account gets a terminal notice with only a
/// dismiss control, so no confirm token for it ever exists.
async fn initiate_link<L: Ledger>(
    store: &LinkStore,
    ledger: &L,
    account: AccountId,
) -> Result<InlineResult, BotError> {
    let accounts = ledger.accounts().await?;
    let snapshot = accounts
        .iter()
        .find(|a| a.id == account)
        .ok_or(BotError::UnknownAccount(account))?;

    if store.account_linked(account)? {
        return Ok(InlineResult {
            title: format!("Account {} already linked", account),
            body: format!(
                "Ledger account {} ({}) is already bound to a chat identity.",
                account, snapshot.name
            ),
            keyboard: Some(Keyboard::dismiss()),
        });
    }

    Ok(InlineResult {
        title: format!("Link account {}", account),
        body: format!(
            "Press confirm to bind your chat identity to ledger account {} ({}).",
            account, snapshot.name
        ),
        keyboard: Some(Keyboard::confirm_cancel(&ActionToken::LinkRequest {
            account,
        })),
    })
}

fn promote_proposal() -> InlineResult {
    InlineResult {
        title: "Promote to administrator".to_string(),
        body: "Press confirm to become an administrator. \
               Your public handle will be stored."
            .to_string(),
        keyboard: Some(Keyboard::confirm_cancel(&ActionToken::PromoteRequest)),
    }
}

/// Resolve a pressed handshake button against current store state.
///
/// Pure store work, no gateway calls: everything the confirm needs was
/// either carried in the token or lives in the store right now.
pub fn resolve(
    store: &LinkStore,
    presser: &Identity,
    token: &ActionToken,
) -> Result<Resolution, BotError> {
    match token {
        ActionToken::LinkRequest { account } => {
            store.create_link(presser.platform_id, *account, None)?;
            Ok(Resolution {
                final_text: format!(
                    "Linked {} to ledger account {}.",
                    presser_name(presser),
                    account
                ),
                ack: "Linked!".to_string(),
            })
        }
        ActionToken::PromoteRequest => {
            if store.resolve_account(presser.platform_id)?.is_none() {
                return Err(BotError::NotLinked);
            }
            store.promote(presser.platform_id, presser.handle.as_deref())?;
            Ok(Resolution {
                final_text: format!("{} is now an administrator.", presser_name(presser)),
                ack: "Promoted!".to_string(),
            })
        }
        ActionToken::Cancel => Err(BotError::Cancelled),
        // Purchase tokens are routed to the purchase flow before this is
        // reached; one arriving here means the message was miswired.
        ActionToken::PurchaseRequest { .. } => Err(BotError::MalformedToken),
    }
}

fn presser_name(presser: &Identity) -> String {
    presser
        .handle
        .clone()
        .unwrap_or_else(|| presser.platform_id.to_string())
}
