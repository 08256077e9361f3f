///! Reverse geocoding client (OpenCage-style API)
///!
///! Strictly best-effort: any failure resolves to `None`. A satellite
///! notification never waits on, or fails because of, a place name.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// Resolve a coordinate pair to a human-readable place name.
#[async_trait]
pub trait PlaceResolver: Send + Sync {
    async fn resolve_place(&self, latitude: f64, longitude: f64) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    formatted: Option<String>,
}

pub struct GeocodeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeocodeClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()
            .context("Failed to build geocoder HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn query_url(&self, latitude: f64, longitude: f64) -> String {
        let query = format!("{}+{}", latitude, longitude);
        format!(
            "{}?q={}&key={}",
            self.base_url,
            urlencoding::encode(&query),
            self.api_key
        )
    }

    async fn fetch_place(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        let url = self.query_url(latitude, longitude);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Geocode request failed")?
            .error_for_status()
            .context("Geocode request rejected")?;

        let payload: GeocodeResponse = response
            .json()
            .await
            .context("Failed to parse geocode response")?;

        Ok(payload
            .results
            .into_iter()
            .next()
            .and_then(|result| result.formatted))
    }
}

#[async_trait]
impl PlaceResolver for GeocodeClient {
    async fn resolve_place(&self, latitude: f64, longitude: f64) -> Option<String> {
        match self.fetch_place(latitude, longitude).await {
            Ok(place) => place,
            Err(e) => {
                // An empty result set is a normal value; only transport and
                // parse problems are worth a log line, and only at debug.
                tracing::debug!("Reverse geocode for {}, {} failed: {:#}", latitude, longitude, e);
                None
            }
        }
    }
}
