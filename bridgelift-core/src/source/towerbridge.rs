//! The Tower Bridge lift-times page.

use std::time::Duration;

use crate::error::{BridgeLiftError, BridgeLiftResult};
use crate::source::{LiftSource, Snapshot, parse_schedule};

pub const DEFAULT_URL: &str = "https://www.towerbridge.org.uk/lift-times";

const USER_AGENT: &str = concat!("bridgelift/", env!("CARGO_PKG_VERSION"));

/// Fetches and scrapes the published lift schedule.
pub struct TowerBridgeSource {
    url: String,
    client: reqwest::Client,
}

impl TowerBridgeSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> BridgeLiftResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeLiftError::Fetch(format!("Failed to build HTTP client: {e}")))?;

        Ok(TowerBridgeSource {
            url: url.into(),
            client,
        })
    }
}

impl LiftSource for TowerBridgeSource {
    fn name(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> BridgeLiftResult<Snapshot> {
        tracing::debug!(url = %self.url, "Fetching lift schedule");

        let response = self
            .client
            .get(&self.url)
            .header("Accept-Language", "en-GB,en;q=0.9")
            .send()
            .await
            .map_err(|e| BridgeLiftError::Fetch(format!("request to {} failed: {e}", self.url)))?
            .error_for_status()
            .map_err(|e| BridgeLiftError::Fetch(format!("{} returned an error: {e}", self.url)))?;

        let html = response
            .text()
            .await
            .map_err(|e| BridgeLiftError::Fetch(format!("failed to read response body: {e}")))?;

        tracing::trace!(bytes = html.len(), "Lift schedule page received");

        parse_schedule(&html)
    }
}
