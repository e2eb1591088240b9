//! Forward geocoding (Open-Meteo search) and reverse geocoding (Nominatim).

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use chinook_core::{cancellable, FetchError, NetworkError, ReqwestErrorExt};

use crate::types::Location;

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";
const SEARCH_PATH: &str = "/v1/search";
const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const REVERSE_PATH: &str = "/reverse";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Minimum query length before a search is dispatched.
pub const MIN_QUERY_LEN: usize = 2;
const RESULT_COUNT: u32 = 10;

/// Label used when reverse geocoding cannot name the place.
pub const FALLBACK_PLACE_NAME: &str = "Your Location";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    #[serde(default)]
    admin1: Option<String>,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    timezone: Option<String>,
}

impl From<SearchResult> for Location {
    fn from(r: SearchResult) -> Self {
        Location {
            name: r.name,
            admin1: r.admin1,
            latitude: r.latitude,
            longitude: r.longitude,
            timezone: r.timezone,
        }
    }
}

/// City-name search against the Open-Meteo geocoding API, filtered to one
/// country.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    base_url: String,
    country_code: String,
    language: String,
}

impl GeocodeClient {
    pub fn new(country_code: &str, language: &str) -> Result<Self, FetchError> {
        Self::with_base_url(GEOCODING_URL, country_code, language)
    }

    pub fn with_base_url(
        base_url: &str,
        country_code: &str,
        language: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Network(e.into_network_error()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            country_code: country_code.to_string(),
            language: language.to_string(),
        })
    }

    /// Searches for places matching `query`. Queries shorter than
    /// [`MIN_QUERY_LEN`] after trimming return an empty list without a
    /// network round trip.
    #[instrument(skip(self, token))]
    pub async fn search(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<Vec<Location>, FetchError> {
        let trimmed = query.trim();
        if trimmed.len() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }
        cancellable(token, self.search_inner(trimmed)).await
    }

    async fn search_inner(&self, query: &str) -> Result<Vec<Location>, FetchError> {
        let url = format!("{}{}", self.base_url, SEARCH_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("name", query.to_string()),
                ("count", RESULT_COUNT.to_string()),
                ("country_code", self.country_code.clone()),
                ("language", self.language.clone()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Network(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            }));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| FetchError::MalformedResponse(format!("geocoding JSON: {}", e)))?;
        debug!(count = body.results.len(), "Geocoding search complete");
        Ok(body.results.into_iter().map(Location::from).collect())
    }
}

#[derive(Debug, Deserialize, Default)]
struct ReverseResponse {
    #[serde(default)]
    address: ReverseAddress,
}

#[derive(Debug, Deserialize, Default)]
struct ReverseAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    province: Option<String>,
}

/// Names a coordinate pair via Nominatim. Failures degrade to a generic
/// label instead of erroring, so a flaky reverse lookup never blocks the
/// forecast for a located device.
#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: Client,
    base_url: String,
}

impl ReverseGeocoder {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(NOMINATIM_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Network(e.into_network_error()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolves a location for device coordinates. Always succeeds with at
    /// least the fallback label unless cancelled.
    #[instrument(skip(self, token))]
    pub async fn locate(
        &self,
        latitude: f64,
        longitude: f64,
        token: &CancellationToken,
    ) -> Result<Location, FetchError> {
        let named = cancellable(token, self.reverse_inner(latitude, longitude)).await;
        match named {
            Ok(location) => Ok(location),
            Err(err) if err.is_cancelled() => Err(err),
            Err(err) => {
                warn!(error = %err, "Reverse geocoding failed, using fallback label");
                Ok(Location::new(FALLBACK_PLACE_NAME, latitude, longitude))
            }
        }
    }

    async fn reverse_inner(&self, lat: f64, lon: f64) -> Result<Location, FetchError> {
        let url = format!("{}{}", self.base_url, REVERSE_PATH);
        let response = self
            .client
            .get(&url)
            // zoom 10 resolves to city level
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("format", "json".to_string()),
                ("zoom", "10".to_string()),
            ])
            .header("Accept-Language", "en")
            .send()
            .await
            .map_err(|e| FetchError::Network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network(NetworkError::ServerError {
                status: status.as_u16(),
                message: String::new(),
            }));
        }

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| FetchError::MalformedResponse(format!("reverse geocoding JSON: {}", e)))?;

        let addr = body.address;
        let name = addr
            .city
            .or(addr.town)
            .or(addr.village)
            .or(addr.municipality)
            .unwrap_or_else(|| FALLBACK_PLACE_NAME.to_string());
        let admin1 = addr.state.or(addr.province);

        Ok(Location {
            name,
            admin1,
            latitude: lat,
            longitude: lon,
            timezone: None,
        })
    }
}
