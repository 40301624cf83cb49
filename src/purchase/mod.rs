//! Purchase transaction flow.
//!
//! # Responsibilities
//! - Match a selection (free-text catalog line or purchase button) against
//!   a fresh catalog snapshot
//! - Issue exactly one charge attempt per accepted selection
//! - Render the post-charge balance from a fresh fetch, never computed
//!   locally
//!
//! # Design Decisions
//! - The charge endpoint has no idempotency key, so an ambiguous failure is
//!   surfaced instead of retried; only the read-only fetches retry (inside
//!   the gateway client)
//! - The button path redraws the catalog keyboard on the same message so it
//!   stays usable for a repeat purchase

use crate::error::BotError;
use crate::gateway::types::{AccountId, CatalogItem, DrinkId, Money};
use crate::gateway::Ledger;
use crate::router::render::{Button, Keyboard};
use crate::store::{LinkStore, PlatformId};
use crate::token::ActionToken;

/// Outcome of an accepted purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Balance message for the buyer.
    pub text: String,
    /// Transient acknowledgement (button path).
    pub ack: String,
    /// Redrawn catalog keyboard (button path only).
    pub keyboard: Option<Keyboard>,
}

/// The exact line the bot displays per drink, and the exact line the
/// free-text path accepts back. Prices always carry two decimals.
pub fn catalog_line(item: &CatalogItem) -> String {
    format!("{}: {}€", item.name, item.price)
}

/// Text body for `/list`: one line per active drink.
pub fn catalog_text(catalog: &[CatalogItem]) -> String {
    let lines: Vec<String> = catalog
        .iter()
        .filter(|i| i.active)
        .map(catalog_line)
        .collect();
    if lines.is_empty() {
        "No drinks available right now.".to_string()
    } else {
        lines.join("\n")
    }
}

/// Inline keyboard with one purchase button per active drink.
pub fn purchase_keyboard(catalog: &[CatalogItem]) -> Keyboard {
    let mut keyboard = Keyboard::default();
    for item in catalog.iter().filter(|i| i.active) {
        keyboard.push_row(vec![Button::new(
            catalog_line(item),
            &ActionToken::PurchaseRequest { drink: item.id },
        )]);
    }
    keyboard
}

/// Path (a): a free-text message echoing a displayed catalog line.
pub async fn buy_by_text<L: Ledger>(
    store: &LinkStore,
    ledger: &L,
    buyer: PlatformId,
    text: &str,
) -> Result<Receipt, BotError> {
    let account = resolve_buyer(store, buyer)?;
    let catalog = ledger.catalog().await?;
    let wanted = text.trim();
    let item = catalog
        .iter()
        .filter(|i| i.active)
        .find(|i| catalog_line(i) == wanted)
        .ok_or(BotError::UnknownDrink)?;
    let text = settle(ledger, account, item).await?;
    Ok(Receipt {
        text,
        ack: format!("Bought {}", item.name),
        keyboard: None,
    })
}

/// Path (b): a purchase button press. The receipt carries a keyboard
/// rebuilt from the same fresh catalog snapshot, to be redrawn in place.
pub async fn buy_by_button<L: Ledger>(
    store: &LinkStore,
    ledger: &L,
    buyer: PlatformId,
    drink: DrinkId,
) -> Result<Receipt, BotError> {
    let account = resolve_buyer(store, buyer)?;
    let catalog = ledger.catalog().await?;
    let item = catalog
        .iter()
        .find(|i| i.id == drink && i.active)
        .ok_or(BotError::UnknownDrink)?;
    let text = settle(ledger, account, item).await?;
    Ok(Receipt {
        text,
        ack: format!("Bought {}", item.name),
        keyboard: Some(purchase_keyboard(&catalog)),
    })
}

/// Balance message for `/balance`, with the same negative-balance warning
/// the purchase receipts use.
pub async fn balance_text<L: Ledger>(
    store: &LinkStore,
    ledger: &L,
    who: PlatformId,
) -> Result<String, BotError> {
    let account = resolve_buyer(store, who)?;
    let balance = fetch_balance(ledger, account).await?;
    Ok(render_balance("Your balance", balance))
}

fn resolve_buyer(store: &LinkStore, buyer: PlatformId) -> Result<AccountId, BotError> {
    store.resolve_account(buyer)?.ok_or(BotError::NotLinked)
}

/// One charge attempt, then a fresh balance fetch. The charge is never
/// retried; a failure here may or may not have charged, which is exactly
/// why the balance is re-read instead of computed.
async fn settle<L: Ledger>(
    ledger: &L,
    account: AccountId,
    item: &CatalogItem,
) -> Result<String, BotError> {
    ledger.purchase(account, item.id).await?;
    tracing::info!(account = %account, drink = %item.id, price = %item.price, "Charged drink");
    let balance = fetch_balance(ledger, account).await?;
    Ok(render_balance(
        &format!("{} for {}€. New balance", item.name, item.price),
        balance,
    ))
}

async fn fetch_balance<L: Ledger>(ledger: &L, account: AccountId) -> Result<Money, BotError> {
    let accounts = ledger.accounts().await?;
    accounts
        .iter()
        .find(|a| a.id == account)
        .map(|a| a.balance)
        .ok_or(BotError::UnknownAccount(account))
}

fn render_balance(prefix: &str, balance: Money) -> String {
    let mut text = format!("{}: {}€", prefix, balance);
    if balance.is_negative() {
        text.push_str("\nWarning: your balance is negative. Please settle up.");
    }
    text
}
