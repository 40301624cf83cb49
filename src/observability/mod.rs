//! Observability subsystem.
//!
//! Structured logs go through `tracing` (initialized in `main`); this
//! module owns the Prometheus counters.

pub mod metrics;
