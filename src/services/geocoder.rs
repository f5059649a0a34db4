//! Address geocoding against a Nominatim-compatible search API

use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;
use crate::config::settings::GeocoderConfig;
use crate::utils::errors::{EventDeskError, Result};

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

/// Best-effort address lookup
#[derive(Clone)]
pub struct Geocoder {
    http_client: reqwest::Client,
    base_url: Url,
    enabled: bool,
}

impl Geocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(&config.base_url)?,
            enabled: config.enabled,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Best match for `address`. No match, a blank address and a disabled
    /// geocoder all give `Ok(None)`.
    pub async fn lookup(&self, address: &str) -> Result<Option<Coordinates>> {
        let address = address.trim();
        if !self.enabled || address.is_empty() {
            return Ok(None);
        }

        let mut url = self.base_url.join("search")?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", address)
            .append_pair("limit", "1");

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EventDeskError::Geocoding(format!("Geocoder returned {}", status)));
        }

        let results: Vec<SearchResult> = response.json().await?;
        let Some(best) = results.into_iter().next() else {
            debug!(address = %address, "No geocoding result");
            return Ok(None);
        };

        let lat = best
            .lat
            .parse::<f64>()
            .map_err(|e| EventDeskError::Geocoding(format!("Invalid latitude {}: {}", best.lat, e)))?;
        let lng = best
            .lon
            .parse::<f64>()
            .map_err(|e| EventDeskError::Geocoding(format!("Invalid longitude {}: {}", best.lon, e)))?;

        debug!(address = %address, lat, lng, "Address geocoded");
        Ok(Some(Coordinates { lat, lng }))
    }
}
