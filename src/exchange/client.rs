//! REST client for the venue's clearinghouse state.
//!
//! Read-only access to a wallet's open positions on a builder-deployed
//! dex of the Hyperliquid testnet:
//! - Open positions with size, leverage, and entry price
//! - Liquidation prices and unrealized PnL
//!
//! Address validation happens locally before any request is made.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::VenueConfig;
use crate::error::MonitorError;

use super::traits::PositionSource;
use super::types::*;

/// Base URL for the Hyperliquid testnet API.
const TESTNET_API_URL: &str = "https://api.hyperliquid-testnet.xyz";

/// Builder dex carrying the Ventuals perpetuals.
const VENTUALS_DEX: &str = "vntls";

/// Client for fetching a wallet's positions from the venue.
#[derive(Debug, Clone)]
pub struct VentualsClient {
    client: Client,
    base_url: String,
    dex: String,
}

impl VentualsClient {
    /// Create a client from venue configuration.
    pub fn new(config: &VenueConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            dex: config.dex.clone(),
        })
    }

    /// Create a client with a custom base URL and dex namespace.
    pub fn with_base_url(base_url: &str, dex: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            dex: dex.to_string(),
        })
    }

    /// Create a client for the Hyperliquid testnet with the Ventuals dex.
    pub fn testnet() -> Result<Self> {
        Self::with_base_url(TESTNET_API_URL, VENTUALS_DEX)
    }

    /// Raw clearinghouse query; assumes the address was already validated.
    #[instrument(skip(self), name = "vntls_clearinghouse_state")]
    async fn clearinghouse_state(&self, wallet: &str) -> Result<Vec<PositionSnapshot>> {
        let url = format!("{}/info", self.base_url);
        let request = InfoRequest::ClearinghouseState {
            user: wallet.to_string(),
            dex: self.dex.clone(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send clearinghouseState request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Venue API error {}: {}", status, body);
        }

        let state: ClearinghouseState = response
            .json()
            .await
            .context("Failed to parse clearinghouseState response")?;

        let positions: Vec<PositionSnapshot> = state
            .asset_positions
            .iter()
            .filter_map(|entry| entry.position.to_snapshot())
            .collect();

        debug!(
            wallet = %wallet,
            open_positions = positions.len(),
            "Fetched clearinghouse state"
        );

        Ok(positions)
    }
}

#[async_trait]
impl PositionSource for VentualsClient {
    async fn fetch_positions(
        &self,
        wallet: &str,
    ) -> Result<Vec<PositionSnapshot>, MonitorError> {
        if !is_valid_address(wallet) {
            return Err(MonitorError::InvalidAddress(wallet.to_string()));
        }

        self.clearinghouse_state(wallet)
            .await
            .map_err(MonitorError::SourceUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const WALLET: &str = "0x1234567890abcdef1234567890abcdef12345678";

    fn state_body() -> serde_json::Value {
        json!({
            "assetPositions": [
                {
                    "type": "oneWay",
                    "position": {
                        "coin": "vntls:NVDA",
                        "szi": "10",
                        "leverage": {"type": "isolated", "value": 10},
                        "entryPx": "10.3",
                        "positionValue": "99.1",
                        "unrealizedPnl": "-3.9",
                        "liquidationPx": "10.455",
                        "marginUsed": "9.91"
                    }
                },
                {
                    "type": "oneWay",
                    "position": {
                        "coin": "vntls:TSLA",
                        "szi": "0",
                        "leverage": {"type": "cross", "value": 3},
                        "positionValue": "0",
                        "unrealizedPnl": "0",
                        "liquidationPx": null
                    }
                }
            ],
            "time": 1735000000000u64
        })
    }

    #[tokio::test]
    async fn test_fetches_open_positions() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/info"))
            .and(body_partial_json(json!({
                "type": "clearinghouseState",
                "user": WALLET,
                "dex": "vntls"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(state_body()))
            .mount(&server)
            .await;

        let client = VentualsClient::with_base_url(&server.uri(), "vntls").unwrap();
        let positions = client.fetch_positions(WALLET).await.unwrap();

        // The flat TSLA entry is filtered out
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].coin, "NVDA");
        assert_eq!(positions[0].mark_price, dec!(9.91));
        assert_eq!(positions[0].liquidation_price, Some(dec!(10.455)));
    }

    #[tokio::test]
    async fn test_api_error_is_source_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let client = VentualsClient::with_base_url(&server.uri(), "vntls").unwrap();
        let err = client.fetch_positions(WALLET).await.unwrap_err();

        assert!(matches!(err, MonitorError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_source_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = VentualsClient::with_base_url(&server.uri(), "vntls").unwrap();
        let err = client.fetch_positions(WALLET).await.unwrap_err();

        assert!(matches!(err, MonitorError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_malformed_address_never_hits_the_wire() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(state_body()))
            .expect(0)
            .mount(&server)
            .await;

        let client = VentualsClient::with_base_url(&server.uri(), "vntls").unwrap();
        let err = client.fetch_positions("not_an_address").await.unwrap_err();

        assert!(matches!(err, MonitorError::InvalidAddress(_)));
    }
}
