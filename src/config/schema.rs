//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files;
//! every field has a default so a minimal config file works.

use serde::{Deserialize, Serialize};

/// Root configuration for the bot.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BotConfig {
    /// Ledger gateway settings.
    pub gateway: GatewayConfig,

    /// Link store settings.
    pub store: StoreConfig,

    /// Bootstrap administrator seed.
    pub bootstrap: BootstrapConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ledger gateway settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the mete API (e.g. "http://localhost:5000").
    pub base_url: String,

    /// Per-request deadline in seconds. Applies to every gateway call.
    pub request_timeout_secs: u64,

    /// How many times a read-only fetch is retried before surfacing an
    /// upstream failure. The charge call is never retried.
    pub read_retries: u32,

    /// Base delay for retry backoff, milliseconds.
    pub backoff_base_ms: u64,

    /// Backoff cap, milliseconds.
    pub backoff_max_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 10,
            read_retries: 2,
            backoff_base_ms: 200,
            backoff_max_ms: 2_000,
        }
    }
}

/// Link store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON file holding the link records.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "links.json".to_string(),
        }
    }
}

/// Bootstrap administrator: the one identity that can start linking
/// everyone else. Seeded on startup if both fields are set and the
/// identity is not yet in the store.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BootstrapConfig {
    pub admin_platform_id: Option<i64>,
    pub admin_account_id: Option<u32>,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Whether to expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Bind address for the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9000".to_string(),
        }
    }
}
