use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::games::LatLng;
use crate::util::{is_geocodable, SecretString};

pub const GOOGLE_MAPS_BASE_URL: &str = "https://maps.googleapis.com";

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Coordinates for a free-form place name; `None` when nothing matched.
    async fn geocode(&self, place: &str) -> Result<Option<LatLng>>;
}

/// Google Geocoding API.
pub struct GoogleGeocoder {
    api_key: SecretString,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

impl GoogleGeocoder {
    pub fn new(api_key: String, timeout_secs: u64) -> Result<Self> {
        Self::with_base_url(api_key, GOOGLE_MAPS_BASE_URL.to_string(), timeout_secs)
    }

    pub fn with_base_url(api_key: String, base_url: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, place: &str) -> Result<Option<LatLng>> {
        if !is_geocodable(place) {
            return Ok(None);
        }

        debug!("Geocoding {:?}", place);
        let url = format!("{}/maps/api/geocode/json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("address", place), ("key", self.api_key.expose())])
            .send()
            .await
            .context("failed to send geocoding request")?;

        if !response.status().is_success() {
            bail!("geocoding API error {}", response.status());
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .context("failed to parse geocoding response")?;

        match body.status.as_str() {
            "OK" => Ok(body.results.first().map(|r| r.geometry.location)),
            "ZERO_RESULTS" => Ok(None),
            other => bail!(
                "geocoding failed with status {}: {}",
                other,
                body.error_message.unwrap_or_default()
            ),
        }
    }
}
