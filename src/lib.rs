//! Mate bot core library.
//!
//! Binds chat identities to accounts in an external mete ledger, runs the
//! two-party link/promote confirmation handshake, and charges linked
//! identities for catalog items.

pub mod config;
pub mod error;
pub mod gateway;
pub mod handshake;
pub mod observability;
pub mod purchase;
pub mod resilience;
pub mod router;
pub mod store;
pub mod token;

pub use config::BotConfig;
pub use error::BotError;
pub use router::Bot;
pub use store::LinkStore;
