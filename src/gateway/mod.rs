//! Ledger gateway subsystem.
//!
//! # Data Flow
//! ```text
//! handshake / purchase flow
//!     → Ledger trait (accounts, catalog, purchase)
//!     → client.rs (reqwest, bounded timeout, read retries)
//!     → mete HTTP API
//! ```
//!
//! # Design Decisions
//! - Flows are generic over [`Ledger`] so tests can substitute a
//!   programmable double and count charge calls
//! - Strict decode into fixed-shape records; a malformed payload is an
//!   upstream failure, not a silent default

pub mod client;
pub mod types;

pub use client::MeteClient;
pub use types::{AccountId, AccountSnapshot, CatalogItem, DrinkId, GatewayError, Money};

use types::GatewayResult;

/// Read and charge operations against the external ledger.
///
/// `purchase` is side-effecting and carries no idempotency key; callers
/// must issue at most one attempt per accepted user action.
#[allow(async_fn_in_trait)]
pub trait Ledger {
    /// Fresh snapshot of all ledger accounts.
    async fn accounts(&self) -> GatewayResult<Vec<AccountSnapshot>>;

    /// Fresh snapshot of the drink catalog.
    async fn catalog(&self) -> GatewayResult<Vec<CatalogItem>>;

    /// Charge `account` for one unit of `drink`. Fire-and-forget: the
    /// post-charge balance must be verified with a fresh `accounts` fetch.
    async fn purchase(&self, account: AccountId, drink: DrinkId) -> GatewayResult<()>;
}
