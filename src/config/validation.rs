//! Configuration validation.
//!
//! Serde handles the syntactic side; this module checks semantics and
//! returns all violations at once, not just the first.

use crate::config::schema::BotConfig;

/// One semantic violation, naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &BotConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut fail = |field: &str, message: &str| {
        errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    };

    if config.gateway.base_url.trim().is_empty() {
        fail("gateway.base_url", "must not be empty");
    } else if url::Url::parse(config.gateway.base_url.trim()).is_err() {
        fail("gateway.base_url", "is not a valid URL");
    }
    if config.gateway.request_timeout_secs == 0 {
        fail("gateway.request_timeout_secs", "must be greater than zero");
    }
    if config.gateway.backoff_base_ms > config.gateway.backoff_max_ms {
        fail("gateway.backoff_base_ms", "must not exceed backoff_max_ms");
    }

    if config.store.path.trim().is_empty() {
        fail("store.path", "must not be empty");
    }

    let seed = &config.bootstrap;
    if seed.admin_platform_id.is_some() != seed.admin_account_id.is_some() {
        fail(
            "bootstrap",
            "admin_platform_id and admin_account_id must be set together",
        );
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        fail("observability.metrics_address", "is not a valid socket address");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
