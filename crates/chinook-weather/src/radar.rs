//! RainViewer radar frame catalog.
//!
//! Frame selection keeps the latest observed snapshot plus the whole
//! nowcast, so the timeline always starts at "now" and plays forward.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use chinook_core::{cancellable, FetchError, NetworkError, ReqwestErrorExt};

const RAINVIEWER_URL: &str = "https://api.rainviewer.com";
const MAPS_PATH: &str = "/public/weather-maps.json";
const TILE_HOST: &str = "https://tilecache.rainviewer.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// One radar frame: a Unix timestamp and the tile path for that snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarFrame {
    pub time: i64,
    pub path: String,
}

impl RadarFrame {
    /// Tile URL for this frame at the given tile coordinates.
    /// Color scheme 6, smoothed, with snow rendered distinctly.
    pub fn tile_url(&self, zoom: u32, x: u32, y: u32) -> String {
        format!("{}{}/256/{}/{}/{}/6/1_1.png", TILE_HOST, self.path, zoom, x, y)
    }
}

#[derive(Debug, Deserialize)]
struct MapsResponse {
    #[serde(default)]
    radar: RadarSection,
}

#[derive(Debug, Deserialize, Default)]
struct RadarSection {
    #[serde(default)]
    past: Vec<RadarFrame>,
    #[serde(default)]
    nowcast: Vec<RadarFrame>,
}

#[derive(Debug, Clone)]
pub struct RadarClient {
    client: Client,
    base_url: String,
}

impl RadarClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(RAINVIEWER_URL)
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

    /// Fetches the playable frame list: the most recent past frame followed
    /// by every nowcast frame. Empty when the service has no radar data.
    #[instrument(skip(self, token))]
    pub async fn frames(&self, token: &CancellationToken) -> Result<Vec<RadarFrame>, FetchError> {
        cancellable(token, self.frames_inner()).await
    }

    async fn frames_inner(&self) -> Result<Vec<RadarFrame>, FetchError> {
        let url = format!("{}{}", self.base_url, MAPS_PATH);
        let response = self
            .client
            .get(&url)
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

        let body: MapsResponse = response
            .json()
            .await
            .map_err(|e| FetchError::MalformedResponse(format!("radar JSON: {}", e)))?;

        let mut frames = Vec::with_capacity(1 + body.radar.nowcast.len());
        if let Some(latest) = body.radar.past.into_iter().last() {
            frames.push(latest);
        }
        frames.extend(body.radar.nowcast);
        Ok(frames)
    }
}
