//! HTTP client for the mete ledger API.
//!
//! # Responsibilities
//! - Fetch account and catalog snapshots (`users.json`, `drinks.json`)
//! - Issue the charge call (`users/{id}/buy?drink={id}`)
//! - Enforce a bounded timeout on every request
//! - Retry read-only fetches with jittered backoff; never retry the charge
//!
//! No caching: every read is a fresh fetch, because a stale catalog or
//! balance directly causes mis-charges.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::gateway::types::{
    AccountId, AccountSnapshot, CatalogItem, DrinkId, GatewayError, GatewayResult,
};
use crate::gateway::Ledger;
use crate::observability::metrics;
use crate::resilience::backoff;

/// Client for the mete HTTP API.
#[derive(Clone)]
pub struct MeteClient {
    http: reqwest::Client,
    base: Url,
    read_retries: u32,
    backoff_base_ms: u64,
    backoff_max_ms: u64,
}

impl MeteClient {
    /// Build a client from configuration. Fails on an unusable base URL.
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base: Url = base
            .parse()
            .map_err(|e| GatewayError::Url(format!("{}: {}", config.base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base,
            read_retries: config.read_retries,
            backoff_base_ms: config.backoff_base_ms,
            backoff_max_ms: config.backoff_max_ms,
        })
    }

    fn endpoint(&self, path: &str) -> GatewayResult<Url> {
        self.base
            .join(path)
            .map_err(|e| GatewayError::Url(format!("{}: {}", path, e)))
    }

    /// GET a JSON document, retrying up to the configured bound.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let url = self.endpoint(path)?;
        let mut attempt = 0u32;
        loop {
            match self.try_get(&url).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.read_retries => {
                    attempt += 1;
                    let delay =
                        backoff::retry_delay(attempt, self.backoff_base_ms, self.backoff_max_ms);
                    tracing::warn!(
                        url = %url,
                        attempt,
                        error = %e,
                        "Gateway read failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    metrics::record_gateway_error(path);
                    return Err(e);
                }
            }
        }
    }

    async fn try_get<T: DeserializeOwned>(&self, url: &Url) -> GatewayResult<T> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(map_transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }
        response.json().await.map_err(|e| {
            if e.is_decode() {
                GatewayError::Decode(e.to_string())
            } else {
                map_transport(e)
            }
        })
    }
}

impl Ledger for MeteClient {
    async fn accounts(&self) -> GatewayResult<Vec<AccountSnapshot>> {
        self.get_json("api/v1/users.json").await
    }

    async fn catalog(&self) -> GatewayResult<Vec<CatalogItem>> {
        self.get_json("api/v1/drinks.json").await
    }

    /// One charge attempt, never retried. The response body is not part of
    /// the contract; only the status line is checked, and the caller
    /// verifies the outcome by re-fetching the balance.
    async fn purchase(&self, account: AccountId, drink: DrinkId) -> GatewayResult<()> {
        let url = self.endpoint(&format!("api/v1/users/{}/buy", account))?;
        let result = self
            .http
            .get(url)
            .query(&[("drink", drink.0)])
            .send()
            .await
            .map_err(map_transport);
        match result {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    Ok(())
                } else {
                    metrics::record_gateway_error("buy");
                    Err(GatewayError::Status(status.as_u16()))
                }
            }
            Err(e) => {
                metrics::record_gateway_error("buy");
                Err(e)
            }
        }
    }
}

fn map_transport(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::GatewayConfig;

    #[test]
    fn endpoints_join_against_base() {
        let config = GatewayConfig {
            base_url: "http://localhost:5000".to_string(),
            ..GatewayConfig::default()
        };
        let client = MeteClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("api/v1/users.json").unwrap().as_str(),
            "http://localhost:5000/api/v1/users.json"
        );
        assert_eq!(
            client.endpoint("api/v1/users/42/buy").unwrap().as_str(),
            "http://localhost:5000/api/v1/users/42/buy"
        );
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let config = GatewayConfig {
            base_url: "http://mete.example/".to_string(),
            ..GatewayConfig::default()
        };
        let client = MeteClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("api/v1/drinks.json").unwrap().as_str(),
            "http://mete.example/api/v1/drinks.json"
        );
    }

    #[test]
    fn rejects_garbage_base_url() {
        let config = GatewayConfig {
            base_url: "not a url".to_string(),
            ..GatewayConfig::default()
        };
        assert!(matches!(MeteClient::new(&config), Err(GatewayError::Url(_))));
    }
}
