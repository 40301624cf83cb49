//! Resilience subsystem.
//!
//! # Design Decisions
//! - Every gateway call has a deadline; there are no unbounded waits
//! - Only read-only fetches are retried; the charge call never is, since a
//!   duplicate attempt would double-charge
//! - Jittered exponential backoff between retries

pub mod backoff;
