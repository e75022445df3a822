//! Geocoding: resolve free-text descriptions to coordinates.
//!
//! This is the only per-pin network stage and the only recoverable one.
//! `resolve` returns a plain `Result` — success-with-location or
//! failure-with-reason — and the orchestrator buckets accordingly; no
//! failure here ever aborts the run.
//!
//! All three failure modes (unreachable provider, zero results,
//! unparseable body) demote the pin identically. The client takes only
//! the first returned result and never tries to disambiguate multiple
//! candidates; a response that doesn't carry a coordinate pair in the
//! expected place is an explicit [`GeocodeError::Malformed`].

use crate::error::GeocodeError;
use crate::output::GeoLocation;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Maps a free-text description to a coordinate pair, or fails.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, free_text: &str) -> Result<GeoLocation, GeocodeError>;
}

/// Client for a Google-style JSON geocoding endpoint.
///
/// Queries `{base}/maps/api/geocode/json?address={text}&sensor=false`.
pub struct JsonGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl JsonGeocoder {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GeocodeError::Transport {
                detail: format!("HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

// ── Wire format ──────────────────────────────────────────────────────────
//
// Only the fields the pipeline reads are modelled; everything else in the
// provider response is ignored by serde.

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

#[derive(Debug, Deserialize)]
struct Coordinates {
    lat: f64,
    lng: f64,
}

#[async_trait]
impl Geocoder for JsonGeocoder {
    async fn resolve(&self, free_text: &str) -> Result<GeoLocation, GeocodeError> {
        let url = format!(
            "{}/maps/api/geocode/json",
            self.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .get(&url)
            .query(&[("address", free_text), ("sensor", "false")])
            .send()
            .await
            .map_err(|e| GeocodeError::Transport {
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(GeocodeError::Transport {
                detail: format!("HTTP {}", response.status()),
            });
        }

        let body = response.text().await.map_err(|e| GeocodeError::Transport {
            detail: e.to_string(),
        })?;

        let parsed: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Malformed {
                detail: e.to_string(),
            })?;

        // First result wins; an empty list covers ZERO_RESULTS and friends.
        let first = parsed.results.into_iter().next().ok_or_else(|| {
            GeocodeError::NoResults {
                query: free_text.to_string(),
            }
        })?;

        let location = GeoLocation {
            latitude: first.geometry.location.lat,
            longitude: first.geometry.location.lng,
        };
        debug!(
            "Geocoded '{}' -> ({}, {})",
            free_text, location.latitude, location.longitude
        );
        Ok(location)
    }
}
