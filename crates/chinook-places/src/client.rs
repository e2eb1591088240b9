//! Google Places web service client.
//!
//! One nearby search per dining type runs in parallel so restaurants,
//! cafés, bars and takeaway spots compete in a single combined ranking.
//! A failed search for one type degrades to an empty list for that type
//! instead of failing the whole lookup.

use std::collections::HashSet;
use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use chinook_core::{cancellable, FetchError, ReqwestErrorExt};

use crate::types::DiningPlace;

const PLACES_URL: &str = "https://maps.googleapis.com";
const NEARBY_PATH: &str = "/maps/api/place/nearbysearch/json";
const DETAILS_PATH: &str = "/maps/api/place/details/json";
const REQUEST_TIMEOUT_SECS: u64 = 10;

const DINING_TYPES: [&str; 4] = ["restaurant", "cafe", "bar", "meal_takeaway"];
const DEFAULT_RADIUS_M: u32 = 5000;
const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<NearbyResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct NearbyResult {
    place_id: String,
    name: String,
    rating: Option<f64>,
    #[serde(default)]
    user_ratings_total: u32,
    price_level: Option<u8>,
    #[serde(default)]
    vicinity: String,
    opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpeningHours {
    open_now: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    result: DetailsResult,
}

#[derive(Debug, Deserialize, Default)]
struct DetailsResult {
    website: Option<String>,
    formatted_phone_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: Client,
    base_url: String,
    api_key: String,
    radius_m: u32,
    top_n: usize,
}

impl PlacesClient {
    pub fn new(api_key: &str) -> Result<Self, FetchError> {
        Self::with_base_url(PLACES_URL, api_key)
    }

    pub fn with_base_url(base_url: &str, api_key: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Network(e.into_network_error()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            radius_m: DEFAULT_RADIUS_M,
            top_n: DEFAULT_TOP_N,
        })
    }

    pub fn radius_m(mut self, radius: u32) -> Self {
        self.radius_m = radius;
        self
    }

    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    /// Finds the highest-rated dining spots near a coordinate pair: merged
    /// across all dining types, deduplicated, ranked by rating with review
    /// count as the tiebreaker, and enriched with website and phone.
    #[instrument(skip(self, token))]
    pub async fn nearby_dining(
        &self,
        latitude: f64,
        longitude: f64,
        token: &CancellationToken,
    ) -> Result<Vec<DiningPlace>, FetchError> {
        cancellable(token, self.nearby_dining_inner(latitude, longitude)).await
    }

    async fn nearby_dining_inner(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<DiningPlace>, FetchError> {
        let searches = DINING_TYPES
            .iter()
            .map(|kind| self.search_type(latitude, longitude, kind));
        let result_lists = join_all(searches).await;

        // Merge and dedupe; unrated places never make the ranking.
        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates: Vec<NearbyResult> = Vec::new();
        for result in result_lists.into_iter().flatten() {
            if result.rating.unwrap_or(0.0) > 0.0 && seen.insert(result.place_id.clone()) {
                candidates.push(result);
            }
        }

        candidates.sort_by(|a, b| {
            let by_rating = b
                .rating
                .unwrap_or(0.0)
                .total_cmp(&a.rating.unwrap_or(0.0));
            by_rating.then(b.user_ratings_total.cmp(&a.user_ratings_total))
        });
        candidates.truncate(self.top_n);
        debug!(count = candidates.len(), "Ranked dining candidates");

        let enriched = join_all(candidates.into_iter().map(|c| self.enrich(c))).await;
        Ok(enriched)
    }

    /// One nearby search for one place type. Failures and non-OK statuses
    /// resolve to an empty list so the other types still rank.
    async fn search_type(&self, latitude: f64, longitude: f64, kind: &str) -> Vec<NearbyResult> {
        let url = format!("{}{}", self.base_url, NEARBY_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("location", format!("{},{}", latitude, longitude)),
                ("radius", self.radius_m.to_string()),
                ("type", kind.to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await;

        let body: Result<NearbyResponse, _> = match response {
            Ok(r) => r.json().await,
            Err(err) => {
                warn!(kind, error = %err, "Nearby search failed");
                return Vec::new();
            }
        };

        match body {
            Ok(parsed) if parsed.status == "OK" => parsed.results,
            Ok(parsed) => {
                if parsed.status != "ZERO_RESULTS" {
                    warn!(kind, status = parsed.status, "Nearby search rejected");
                }
                Vec::new()
            }
            Err(err) => {
                warn!(kind, error = %err, "Nearby search returned bad JSON");
                Vec::new()
            }
        }
    }

    /// Attach website and phone from the details endpoint; a failed details
    /// call leaves those fields empty rather than dropping the place.
    async fn enrich(&self, result: NearbyResult) -> DiningPlace {
        let detail = self.fetch_details(&result.place_id).await;
        DiningPlace {
            rating: result.rating.unwrap_or(0.0),
            total_ratings: result.user_ratings_total,
            price_level: result.price_level,
            open_now: result.opening_hours.and_then(|h| h.open_now),
            website: detail.as_ref().and_then(|d| d.website.clone()),
            phone: detail.and_then(|d| d.formatted_phone_number),
            place_id: result.place_id,
            name: result.name,
            vicinity: result.vicinity,
        }
    }

    async fn fetch_details(&self, place_id: &str) -> Option<DetailsResult> {
        let url = format!("{}{}", self.base_url, DETAILS_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("place_id", place_id.to_string()),
                ("fields", "website,formatted_phone_number".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .ok()?;
        let body: DetailsResponse = response.json().await.ok()?;
        Some(body.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn place(
        id: &str,
        name: &str,
        rating: Option<f64>,
        reviews: u32,
    ) -> serde_json::Value {
        serde_json::json!({
            "place_id": id,
            "name": name,
            "rating": rating,
            "user_ratings_total": reviews,
            "vicinity": "123 Mountain Rd",
            "opening_hours": {"open_now": true}
        })
    }

    fn ok_body(results: Vec<serde_json::Value>) -> serde_json::Value {
        serde_json::json!({"status": "OK", "results": results})
    }

    async fn mount_type(server: &MockServer, kind: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/maps/api/place/nearbysearch/json"))
            .and(query_param("type", kind))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn mount_details(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/maps/api/place/details/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_merges_types_and_ranks_by_rating() {
        let server = MockServer::start().await;
        mount_type(&server, "restaurant", ok_body(vec![
            place("p1", "Summit Grill", Some(4.6), 210),
            place("p2", "Base Diner", Some(4.1), 80),
        ])).await;
        mount_type(&server, "cafe", ok_body(vec![
            place("p3", "Peak Café", Some(4.8), 55),
        ])).await;
        mount_type(&server, "bar", ok_body(vec![])).await;
        mount_type(&server, "meal_takeaway", ok_body(vec![])).await;
        mount_details(&server, serde_json::json!({
            "status": "OK",
            "result": {"website": "https://example.ca", "formatted_phone_number": "613-555-0101"}
        })).await;

        let client = PlacesClient::with_base_url(&server.uri(), "test-key").unwrap();
        let token = CancellationToken::new();
        let places = client.nearby_dining(46.2, -74.58, &token).await.unwrap();

        assert_eq!(places.len(), 3);
        assert_eq!(places[0].name, "Peak Café");
        assert_eq!(places[1].name, "Summit Grill");
        assert_eq!(places[2].name, "Base Diner");
        assert_eq!(places[0].website.as_deref(), Some("https://example.ca"));
        assert_eq!(places[0].phone.as_deref(), Some("613-555-0101"));
        assert_eq!(places[0].open_now, Some(true));
    }

    #[tokio::test]
    async fn test_review_count_breaks_rating_ties() {
        let server = MockServer::start().await;
        mount_type(&server, "restaurant", ok_body(vec![
            place("p1", "Fewer Reviews", Some(4.5), 30),
            place("p2", "More Reviews", Some(4.5), 300),
        ])).await;
        mount_type(&server, "cafe", ok_body(vec![])).await;
        mount_type(&server, "bar", ok_body(vec![])).await;
        mount_type(&server, "meal_takeaway", ok_body(vec![])).await;
        mount_details(&server, serde_json::json!({"status": "OK", "result": {}})).await;

        let client = PlacesClient::with_base_url(&server.uri(), "test-key").unwrap();
        let token = CancellationToken::new();
        let places = client.nearby_dining(46.2, -74.58, &token).await.unwrap();

        assert_eq!(places[0].name, "More Reviews");
        assert_eq!(places[1].name, "Fewer Reviews");
    }

    #[tokio::test]
    async fn test_dedupes_across_types_and_drops_unrated() {
        let server = MockServer::start().await;
        // Same place comes back as both a restaurant and a bar.
        mount_type(&server, "restaurant", ok_body(vec![
            place("dup", "Lodge Taproom", Some(4.2), 100),
            place("unrated", "New Spot", None, 0),
        ])).await;
        mount_type(&server, "bar", ok_body(vec![
            place("dup", "Lodge Taproom", Some(4.2), 100),
        ])).await;
        mount_type(&server, "cafe", ok_body(vec![])).await;
        mount_type(&server, "meal_takeaway", ok_body(vec![])).await;
        mount_details(&server, serde_json::json!({"status": "OK", "result": {}})).await;

        let client = PlacesClient::with_base_url(&server.uri(), "test-key").unwrap();
        let token = CancellationToken::new();
        let places = client.nearby_dining(46.2, -74.58, &token).await.unwrap();

        assert_eq!(places.len(), 1);
        assert_eq!(places[0].place_id, "dup");
    }

    #[tokio::test]
    async fn test_caps_at_top_n() {
        let server = MockServer::start().await;
        let many: Vec<_> = (0..9)
            .map(|i| place(&format!("p{}", i), &format!("Place {}", i), Some(4.0 + i as f64 * 0.1), 10))
            .collect();
        mount_type(&server, "restaurant", ok_body(many)).await;
        mount_type(&server, "cafe", ok_body(vec![])).await;
        mount_type(&server, "bar", ok_body(vec![])).await;
        mount_type(&server, "meal_takeaway", ok_body(vec![])).await;
        mount_details(&server, serde_json::json!({"status": "OK", "result": {}})).await;

        let client = PlacesClient::with_base_url(&server.uri(), "test-key").unwrap();
        let token = CancellationToken::new();
        let places = client.nearby_dining(46.2, -74.58, &token).await.unwrap();

        assert_eq!(places.len(), 5);
        // Highest rated of the nine is Place 8.
        assert_eq!(places[0].name, "Place 8");
    }

    #[tokio::test]
    async fn test_rejected_type_degrades_to_empty() {
        let server = MockServer::start().await;
        mount_type(&server, "restaurant", serde_json::json!({
            "status": "REQUEST_DENIED", "results": []
        })).await;
        mount_type(&server, "cafe", ok_body(vec![
            place("p1", "Only Café", Some(4.0), 12),
        ])).await;
        mount_type(&server, "bar", ok_body(vec![])).await;
        mount_type(&server, "meal_takeaway", ok_body(vec![])).await;
        mount_details(&server, serde_json::json!({"status": "OK", "result": {}})).await;

        let client = PlacesClient::with_base_url(&server.uri(), "test-key").unwrap();
        let token = CancellationToken::new();
        let places = client.nearby_dining(46.2, -74.58, &token).await.unwrap();

        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Only Café");
    }

    #[tokio::test]
    async fn test_failed_details_keeps_the_place() {
        let server = MockServer::start().await;
        mount_type(&server, "restaurant", ok_body(vec![
            place("p1", "Summit Grill", Some(4.6), 210),
        ])).await;
        mount_type(&server, "cafe", ok_body(vec![])).await;
        mount_type(&server, "bar", ok_body(vec![])).await;
        mount_type(&server, "meal_takeaway", ok_body(vec![])).await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/details/json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = PlacesClient::with_base_url(&server.uri(), "test-key").unwrap();
        let token = CancellationToken::new();
        let places = client.nearby_dining(46.2, -74.58, &token).await.unwrap();

        assert_eq!(places.len(), 1);
        assert!(places[0].website.is_none());
        assert!(places[0].phone.is_none());
    }

    #[tokio::test]
    async fn test_cancellation_wins() {
        let client = PlacesClient::with_base_url("http://127.0.0.1:1", "test-key").unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let err = client.nearby_dining(46.2, -74.58, &token).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
