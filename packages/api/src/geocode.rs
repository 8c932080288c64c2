//! # Geocoding adapter
//!
//! Facility lookup turns an address query into provider places. The
//! [`Geocoder`] trait is the seam: [`NominatimGeocoder`] calls the public
//! Nominatim `/search` endpoint over HTTP, tests substitute a stub.
//!
//! A query is either free text (`q`) or structured (`street`, `city`,
//! `county`, `state`, `country`, `postalcode`); Nominatim rejects requests that
//! mix the two, so free text wins when both are present. There is no retry,
//! rate limiting or caching at this layer.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::Place;

/// Upper bound on results requested from the provider.
pub const MAX_LIMIT: u32 = 50;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("query must contain free text or at least one address field")]
    EmptyQuery,

    #[error("geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("geocoding provider returned status {0}")]
    Status(u16),
}

/// Address query accepted by `GET /v1/facilities/search`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeoQuery {
    pub q: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postalcode: Option<String>,
    pub limit: Option<u32>,
}

impl GeoQuery {
    fn structured(&self) -> [(&'static str, &Option<String>); 6] {
        [
            ("street", &self.street),
            ("city", &self.city),
            ("county", &self.county),
            ("state", &self.state),
            ("country", &self.country),
            ("postalcode", &self.postalcode),
        ]
    }

    /// Provider query parameters, or [`GeocodeError::EmptyQuery`] if nothing
    /// non-blank was given.
    pub fn params(&self) -> Result<Vec<(&'static str, String)>, GeocodeError> {
        let mut params = Vec::new();

        match non_blank(&self.q) {
            Some(q) => params.push(("q", q)),
            None => params.extend(
                self.structured()
                    .into_iter()
                    .filter_map(|(key, value)| non_blank(value).map(|v| (key, v))),
            ),
        }

        if params.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        params.push(("format", "json".to_string()));
        if let Some(limit) = self.limit {
            params.push(("limit", limit.clamp(1, MAX_LIMIT).to_string()));
        }
        Ok(params)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &GeoQuery) -> Result<Vec<Place>, GeocodeError>;
}

/// HTTP client for a Nominatim-compatible `/search` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Nominatim's usage policy requires an identifying User-Agent.
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, query: &GeoQuery) -> Result<reqwest::RequestBuilder, GeocodeError> {
        let params = query.params()?;
        Ok(self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&params))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &GeoQuery) -> Result<Vec<Place>, GeocodeError> {
        let response = self.request(query)?.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let places: Vec<Place> = response.json().await?;
        debug!(results = places.len(), "geocoding search completed");
        Ok(places)
    }
}
