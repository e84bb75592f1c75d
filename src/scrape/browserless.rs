//! Client for a Browserless `/content` endpoint.
//!
//! Rendering runs in an isolated browser session on the Browserless side; the
//! session lives only for the duration of one `/content` call and is torn
//! down by the service when the call returns or the deadline expires, so no
//! session can leak across scrape calls.

use std::time::Duration;

use serde_json::json;
use tracing::{debug, instrument};

use crate::error::ScrapeError;

/// Hard deadline for one navigation, client- and server-side.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin HTTP client for the Browserless rendering service.
pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(NAVIGATION_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    /// Render `url` in a headless session and return the settled page HTML.
    #[instrument(level = "debug", skip(self))]
    pub async fn content(&self, url: &str) -> Result<String, ScrapeError> {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        let body = json!({
            "url": url,
            "gotoOptions": {
                "timeout": NAVIGATION_TIMEOUT.as_millis() as u64,
                "waitUntil": "networkidle2",
            },
        });

        let resp = self
            .client
            .post(&endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScrapeError::Render(format!("render request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ScrapeError::Render(format!(
                "render service returned {status}: {message}"
            )));
        }

        let html = resp
            .text()
            .await
            .map_err(|e| ScrapeError::Render(format!("render response unreadable: {e}")))?;
        debug!(bytes = html.len(), "Rendered page content received");
        Ok(html)
    }
}
