//! Environment Canada citypage alert client.
//!
//! The citypage API has no CORS headers and is occasionally unreachable
//! from residential networks, so a failed direct request is retried once
//! through a relay proxy before giving up.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use chinook_core::{cancellable, FetchError, NetworkError, ReqwestErrorExt};

use crate::stations::nearest_station;
use crate::types::{Severity, WeatherAlert};

const EC_CITYPAGE_URL: &str = "https://api.weather.gc.ca";
const ITEMS_PATH: &str = "/collections/citypageweather-realtime/items";
const DEFAULT_PROXY_URL: &str = "https://corsproxy.io/?url=";
const DEFAULT_MAX_STATION_KM: f64 = 250.0;
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct CityPageResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Deserialize, Default)]
struct Properties {
    #[serde(default)]
    warnings: Vec<RawWarning>,
}

#[derive(Debug, Deserialize, Default)]
struct RawWarning {
    #[serde(rename = "type", default)]
    warning_type: Localized,
    #[serde(default)]
    description: Localized,
    #[serde(rename = "expiryTime", default)]
    expiry_time: Localized,
    #[serde(default)]
    url: Localized,
}

/// EC localizes every warning field as an {en, fr} pair.
#[derive(Debug, Deserialize, Default)]
struct Localized {
    en: Option<String>,
    fr: Option<String>,
}

impl Localized {
    fn get(&self, language: &str) -> Option<&str> {
        if language == "fr" {
            self.fr.as_deref()
        } else {
            self.en.as_deref()
        }
    }
}

fn parse_alerts(data: &CityPageResponse, language: &str) -> Vec<WeatherAlert> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut alerts = Vec::new();

    for feature in &data.features {
        for warning in &feature.properties.warnings {
            let warning_type = warning.warning_type.get(language).unwrap_or_default();
            if warning_type.eq_ignore_ascii_case("ended") {
                continue;
            }

            let event = warning
                .description
                .get(language)
                .unwrap_or("Weather Alert")
                .to_string();
            // The same event can appear once per forecast region.
            if !seen.insert(event.clone()) {
                continue;
            }

            let expires = warning.expiry_time.get(language).map(str::to_string);
            alerts.push(WeatherAlert {
                id: format!("{}-{}", event, expires.as_deref().unwrap_or("unscheduled")),
                event,
                severity: Severity::from_warning_type(warning_type),
                expires,
                url: warning.url.get(language).map(str::to_string),
            });
        }
    }

    sort_by_severity(&mut alerts);
    alerts
}

/// Stable descending sort: most urgent first, original order preserved
/// within a severity.
pub fn sort_by_severity(alerts: &mut [WeatherAlert]) {
    alerts.sort_by(|a, b| b.severity.rank().cmp(&a.severity.rank()));
}

#[derive(Debug, Clone)]
pub struct AlertClient {
    client: Client,
    base_url: String,
    pub(crate) proxy_url: String,
    language: String,
    max_station_km: f64,
}

impl AlertClient {
    pub fn new(language: &str) -> Result<Self, FetchError> {
        Self::with_base_url(EC_CITYPAGE_URL, DEFAULT_PROXY_URL, language)
    }

    pub fn with_base_url(
        base_url: &str,
        proxy_url: &str,
        language: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Network(e.into_network_error()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            proxy_url: proxy_url.to_string(),
            language: language.to_string(),
            max_station_km: DEFAULT_MAX_STATION_KM,
        })
    }

    /// Override the station snap radius (km).
    pub fn max_station_km(mut self, km: f64) -> Self {
        self.max_station_km = km;
        self
    }

    /// Resolves active alerts for a coordinate pair by snapping to the
    /// nearest citypage station. Out-of-coverage locations resolve to an
    /// empty list without a network round trip.
    #[instrument(skip(self, token))]
    pub async fn resolve_alerts(
        &self,
        latitude: f64,
        longitude: f64,
        token: &CancellationToken,
    ) -> Result<Vec<WeatherAlert>, FetchError> {
        let Some(station) = nearest_station(latitude, longitude, self.max_station_km) else {
            debug!("No citypage station within range");
            return Ok(Vec::new());
        };
        debug!(station = station.id, "Resolved alert station");
        cancellable(token, self.fetch_station_alerts(station.id)).await
    }

    async fn fetch_station_alerts(&self, station_id: &str) -> Result<Vec<WeatherAlert>, FetchError> {
        let url = format!(
            "{}{}?identifier={}&f=json&limit=1",
            self.base_url,
            ITEMS_PATH,
            urlencoding::encode(station_id)
        );

        let data: CityPageResponse = match self.get_json(&url).await {
            Ok(data) => data,
            Err(err) => {
                warn!(error = %err, "Direct alerts fetch failed, retrying via proxy");
                let proxied = format!("{}{}", self.proxy_url, urlencoding::encode(&url));
                self.get_json(&proxied).await?
            }
        };

        Ok(parse_alerts(&data, &self.language))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
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

        response
            .json()
            .await
            .map_err(|e| FetchError::MalformedResponse(format!("alerts JSON: {}", e)))
    }

    pub(crate) async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
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

        response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.into_network_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn warning(kind: &str, description: &str) -> serde_json::Value {
        serde_json::json!({
            "type": {"en": kind, "fr": kind},
            "description": {"en": description, "fr": description},
            "expiryTime": {"en": "2024-01-16T03:00:00Z", "fr": "2024-01-16T03:00:00Z"},
            "url": {"en": "https://weather.gc.ca/warnings/report_e.html?onrm104"}
        })
    }

    fn citypage_body(warnings: Vec<serde_json::Value>) -> serde_json::Value {
        serde_json::json!({
            "features": [{"properties": {"warnings": warnings}}]
        })
    }

    fn alert(event: &str, severity: Severity) -> WeatherAlert {
        WeatherAlert {
            id: event.to_string(),
            event: event.to_string(),
            severity,
            expires: None,
            url: None,
        }
    }

    #[test]
    fn test_sort_by_severity_descending() {
        let mut alerts = vec![
            alert("a", Severity::Minor),
            alert("b", Severity::Extreme),
            alert("c", Severity::Severe),
        ];
        sort_by_severity(&mut alerts);
        let order: Vec<_> = alerts.iter().map(|a| a.severity).collect();
        assert_eq!(
            order,
            vec![Severity::Extreme, Severity::Severe, Severity::Minor]
        );
    }

    #[test]
    fn test_sort_is_stable_within_a_severity() {
        let mut alerts = vec![
            alert("first", Severity::Severe),
            alert("second", Severity::Severe),
            alert("third", Severity::Extreme),
        ];
        sort_by_severity(&mut alerts);
        assert_eq!(alerts[0].event, "third");
        assert_eq!(alerts[1].event, "first");
        assert_eq!(alerts[2].event, "second");
    }

    #[tokio::test]
    async fn test_resolve_sorts_by_severity_descending() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections/citypageweather-realtime/items"))
            .and(query_param("identifier", "on-118"))
            .respond_with(ResponseTemplate::new(200).set_body_json(citypage_body(vec![
                warning("statement", "Special Weather Statement"),
                warning("warning", "Snowfall Warning"),
                warning("watch", "Winter Storm Watch"),
            ])))
            .mount(&mock_server)
            .await;

        let client = AlertClient::with_base_url(&mock_server.uri(), "unused://", "en").unwrap();
        let token = CancellationToken::new();
        // Ottawa coordinates snap to on-118.
        let alerts = client.resolve_alerts(45.42, -75.70, &token).await.unwrap();

        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].event, "Snowfall Warning");
        assert_eq!(alerts[0].severity, Severity::Severe);
        assert_eq!(alerts[1].severity, Severity::Moderate);
        assert_eq!(alerts[2].severity, Severity::Minor);
    }

    #[tokio::test]
    async fn test_ended_and_duplicate_warnings_are_dropped() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections/citypageweather-realtime/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(citypage_body(vec![
                warning("ended", "Freezing Rain Warning"),
                warning("warning", "Snowfall Warning"),
                warning("warning", "Snowfall Warning"),
            ])))
            .mount(&mock_server)
            .await;

        let client = AlertClient::with_base_url(&mock_server.uri(), "unused://", "en").unwrap();
        let token = CancellationToken::new();
        let alerts = client.resolve_alerts(45.42, -75.70, &token).await.unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].event, "Snowfall Warning");
    }

    #[tokio::test]
    async fn test_out_of_coverage_is_empty_without_network() {
        let client = AlertClient::with_base_url("http://127.0.0.1:1", "unused://", "en").unwrap();
        let token = CancellationToken::new();
        let alerts = client.resolve_alerts(75.0, -100.0, &token).await.unwrap();
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn test_proxy_fallback_when_direct_fails() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/relay"))
            .respond_with(ResponseTemplate::new(200).set_body_json(citypage_body(vec![
                warning("warning", "Blizzard Warning"),
            ])))
            .mount(&mock_server)
            .await;

        // Direct host is unroutable, so the client must retry via the relay.
        let proxy = format!("{}/relay?url=", mock_server.uri());
        let client = AlertClient::with_base_url("http://127.0.0.1:1", &proxy, "en").unwrap();
        let token = CancellationToken::new();
        let alerts = client.resolve_alerts(45.42, -75.70, &token).await.unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].event, "Blizzard Warning");
    }

    #[tokio::test]
    async fn test_french_fields_are_selected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections/citypageweather-realtime/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "features": [{"properties": {"warnings": [{
                    "type": {"en": "warning", "fr": "avertissement de neige"},
                    "description": {"en": "Snowfall Warning", "fr": "Avertissement de neige"},
                    "expiryTime": {"en": "2024-01-16T03:00:00Z", "fr": "2024-01-16T03:00:00Z"}
                }]}}]
            })))
            .mount(&mock_server)
            .await;

        let client = AlertClient::with_base_url(&mock_server.uri(), "unused://", "fr").unwrap();
        let token = CancellationToken::new();
        let alerts = client.resolve_alerts(45.42, -75.70, &token).await.unwrap();

        assert_eq!(alerts[0].event, "Avertissement de neige");
        // French type string is not "warning", so it maps to Minor.
        assert_eq!(alerts[0].severity, Severity::Minor);
    }

    #[tokio::test]
    async fn test_missing_warnings_key_is_empty() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections/citypageweather-realtime/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "features": [{"properties": {}}]
            })))
            .mount(&mock_server)
            .await;

        let client = AlertClient::with_base_url(&mock_server.uri(), "unused://", "en").unwrap();
        let token = CancellationToken::new();
        let alerts = client.resolve_alerts(45.42, -75.70, &token).await.unwrap();
        assert!(alerts.is_empty());
    }
}
