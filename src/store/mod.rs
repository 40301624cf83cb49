//! Persistence subsystem.
//!
//! # Data Flow
//! ```text
//! handshake confirm / bootstrap seed
//!     → links.rs (check-and-mutate under one lock)
//!     → JSON file rewrite (temp file + rename)
//!
//! every read goes through the same lock, so uniqueness checks always
//! observe the latest committed write
//! ```

pub mod links;

pub use links::{LinkRecord, LinkStore, PlatformId, StoreError};
