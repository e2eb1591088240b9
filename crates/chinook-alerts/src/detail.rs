//! Full alert text extraction from Environment Canada warning pages.
//!
//! The warning pages are a Vue SPA; the alert body is only present in the
//! server-rendered state blob embedded as `window.__INITIAL_STATE__={...};`
//! (no spaces around the `=`). The blob is nested JSON, so the end brace is
//! found by depth counting rather than a regex.

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use chinook_core::{cancellable, FetchError};

use crate::client::AlertClient;

const STATE_MARKER: &str = "window.__INITIAL_STATE__=";

/// Extracts the embedded SSR state object from a warning page.
/// Returns `None` when the marker is absent or the blob doesn't parse.
pub fn extract_embedded_state(html: &str) -> Option<Value> {
    let marker_idx = html.find(STATE_MARKER)?;
    let after_marker = &html[marker_idx + STATE_MARKER.len()..];
    let brace_start = after_marker.find('{')?;
    let blob = &after_marker[brace_start..];

    let mut depth = 0usize;
    let mut end = None;
    for (i, c) in blob.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }

    serde_json::from_str(&blob[..=end?]).ok()
}

impl AlertClient {
    /// Fetches the full body text for one alert from its warning page URL.
    ///
    /// The URL encodes the forecast zone after `?` (e.g. `onrm104`) and the
    /// alert UUID after `#`; the body is matched by UUID, falling back to
    /// the zone's first alert. `Ok(None)` means the page had no usable text.
    #[instrument(skip(self, token))]
    pub async fn fetch_alert_body(
        &self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<Option<String>, FetchError> {
        cancellable(token, self.fetch_body_inner(url)).await
    }

    async fn fetch_body_inner(&self, url: &str) -> Result<Option<String>, FetchError> {
        let (base_url, fragment) = match url.split_once('#') {
            Some((base, hash)) => (base, hash),
            None => (url, ""),
        };
        let zone = base_url.split_once('?').map(|(_, z)| z).unwrap_or("");

        // The warning pages block cross-origin reads, so always relay.
        let proxied = format!("{}{}", self.proxy_url, urlencoding::encode(base_url));
        let html = self.get_text(&proxied).await?;

        let Some(state) = extract_embedded_state(&html) else {
            debug!("Warning page had no embedded state");
            return Ok(None);
        };

        let Some(entries) = state["alert"]["alert"][zone]["alerts"].as_array() else {
            return Ok(None);
        };

        let entry = entries
            .iter()
            .find(|a| a["uuid"].as_str() == Some(fragment))
            .or_else(|| entries.first());

        Ok(entry
            .and_then(|a| a["text"].as_str())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_extract_nested_state() {
        let html = r#"<html><script>window.__INITIAL_STATE__={"a":{"b":1},"c":[{"d":2}]};</script></html>"#;
        let state = extract_embedded_state(html).unwrap();
        assert_eq!(state["a"]["b"], 1);
        assert_eq!(state["c"][0]["d"], 2);
    }

    #[test]
    fn test_extract_ignores_braces_past_the_blob() {
        let html = r#"window.__INITIAL_STATE__={"a":1};function f(){return {};}"#;
        let state = extract_embedded_state(html).unwrap();
        assert_eq!(state, serde_json::json!({"a": 1}));
    }

    #[test]
    fn test_extract_without_marker() {
        assert!(extract_embedded_state("<html>no state here</html>").is_none());
    }

    #[test]
    fn test_extract_unbalanced_blob() {
        assert!(extract_embedded_state(r#"window.__INITIAL_STATE__={"a":{"b":1}"#).is_none());
    }

    fn warning_page(zone: &str) -> String {
        format!(
            r#"<html><script>window.__INITIAL_STATE__={{"alert":{{"alert":{{"{}":{{"alerts":[
                {{"uuid":"uuid-1","text":"  First alert body.  "}},
                {{"uuid":"uuid-2","text":"Second alert body."}}
            ]}}}}}}}};</script></html>"#,
            zone
        )
    }

    async fn relay_client(mock_server: &MockServer) -> AlertClient {
        let proxy = format!("{}/relay?url=", mock_server.uri());
        AlertClient::with_base_url("http://127.0.0.1:1", &proxy, "en").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_body_matches_uuid() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/relay"))
            .respond_with(ResponseTemplate::new(200).set_body_string(warning_page("onrm104")))
            .mount(&mock_server)
            .await;

        let client = relay_client(&mock_server).await;
        let token = CancellationToken::new();
        let body = client
            .fetch_alert_body(
                "https://weather.gc.ca/warnings/report_e.html?onrm104#uuid-2",
                &token,
            )
            .await
            .unwrap();
        assert_eq!(body.as_deref(), Some("Second alert body."));
    }

    #[tokio::test]
    async fn test_fetch_body_falls_back_to_first_alert() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/relay"))
            .respond_with(ResponseTemplate::new(200).set_body_string(warning_page("onrm104")))
            .mount(&mock_server)
            .await;

        let client = relay_client(&mock_server).await;
        let token = CancellationToken::new();
        // No fragment: takes the zone's first alert, trimmed.
        let body = client
            .fetch_alert_body(
                "https://weather.gc.ca/warnings/report_e.html?onrm104",
                &token,
            )
            .await
            .unwrap();
        assert_eq!(body.as_deref(), Some("First alert body."));
    }

    #[tokio::test]
    async fn test_fetch_body_no_state_is_none() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/relay"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>plain page</html>"))
            .mount(&mock_server)
            .await;

        let client = relay_client(&mock_server).await;
        let token = CancellationToken::new();
        let body = client
            .fetch_alert_body("https://weather.gc.ca/warnings/report_e.html?onrm104", &token)
            .await
            .unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_fetch_body_unknown_zone_is_none() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/relay"))
            .respond_with(ResponseTemplate::new(200).set_body_string(warning_page("onrm104")))
            .mount(&mock_server)
            .await;

        let client = relay_client(&mock_server).await;
        let token = CancellationToken::new();
        let body = client
            .fetch_alert_body("https://weather.gc.ca/warnings/report_e.html?qcrm99", &token)
            .await
            .unwrap();
        assert!(body.is_none());
    }
}
