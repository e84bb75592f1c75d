//! Rendered extraction: script-executing page render with a minimal-fetch
//! fallback.
//!
//! Unlike the static extractor, this strategy produces page-level text: one
//! record for the whole page rather than one per listing. Sources with a
//! registry entry get their container selector applied to the rendered
//! markup; everything else gets the full visible page text.
//!
//! Rendering is refused outright in a constrained runtime or when no
//! rendering endpoint is configured; every refusal or failure drops to a
//! plain HTTP fetch that emits a single low-confidence record holding the
//! truncated raw body. A page with no text at all produces no record on
//! either path.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use scraper::{Html, Selector};
use tracing::{info, instrument, warn};

use crate::error::ScrapeError;
use crate::models::{CandidateRecord, Confidence};
use crate::scrape::Extract;
use crate::sources::SourceRegistry;
use crate::utils::{collapse_whitespace, truncate_chars};

/// Raw-body fallback records carry at most this much content.
const FALLBACK_MAX_BODY_CHARS: usize = 10_000;

/// Renders pages through Browserless, falling back to a plain fetch.
pub struct RenderedExtractor {
    registry: Arc<SourceRegistry>,
    browserless: Option<crate::scrape::browserless::BrowserlessClient>,
    client: reqwest::Client,
    constrained: bool,
}

impl RenderedExtractor {
    pub fn new(
        registry: Arc<SourceRegistry>,
        browserless: Option<crate::scrape::browserless::BrowserlessClient>,
        user_agent: &str,
        constrained: bool,
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            registry,
            browserless,
            client,
            constrained,
        }
    }

    async fn render(&self, source_id: &str, url: &str) -> Result<CandidateRecord, ScrapeError> {
        if self.constrained {
            return Err(ScrapeError::Render(
                "browser rendering disabled in constrained runtime".to_string(),
            ));
        }
        let Some(ref browserless) = self.browserless else {
            return Err(ScrapeError::Render(
                "no rendering endpoint configured".to_string(),
            ));
        };

        let html = browserless.content(url).await?;
        let text = match self.registry.get(source_id) {
            Some(config) => {
                let joined = container_text(&html, config.selectors.container)?;
                if joined.is_empty() {
                    page_text(&html)
                } else {
                    joined
                }
            }
            None => page_text(&html),
        };
        // A render that produced no visible text still counts: keep the raw
        // markup so classification has something to look at. A fully empty
        // response is a render failure, not a blank record.
        let content = if text.is_empty() {
            truncate_chars(&html, FALLBACK_MAX_BODY_CHARS)
        } else {
            text
        };
        page_record(source_id, url, content, Confidence::Medium)
            .ok_or_else(|| ScrapeError::Render("rendered page was empty".to_string()))
    }

    /// Plain GET emitting one record with the truncated raw body, or none
    /// when the body is empty.
    async fn minimal_fetch(
        &self,
        source_id: &str,
        url: &str,
    ) -> Result<Vec<CandidateRecord>, ScrapeError> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        match page_record(
            source_id,
            url,
            truncate_chars(&body, FALLBACK_MAX_BODY_CHARS),
            Confidence::Low,
        ) {
            Some(record) => {
                info!(bytes = body.len(), "Minimal fetch succeeded");
                Ok(vec![record])
            }
            None => {
                info!("Minimal fetch returned an empty body");
                Ok(Vec::new())
            }
        }
    }
}

impl Extract for RenderedExtractor {
    #[instrument(level = "info", skip(self))]
    async fn extract(
        &self,
        source_id: &str,
        url: &str,
    ) -> Result<Vec<CandidateRecord>, ScrapeError> {
        match self.render(source_id, url).await {
            Ok(record) => {
                info!(chars = record.content.chars().count(), "Rendered page text");
                Ok(vec![record])
            }
            Err(e) => {
                warn!(error = %e, "Rendering unavailable; falling back to minimal fetch");
                self.minimal_fetch(source_id, url).await
            }
        }
    }
}

/// Build the single page-level record for this strategy, discarding blank
/// text outright.
fn page_record(
    source_id: &str,
    url: &str,
    content: String,
    confidence: Confidence,
) -> Option<CandidateRecord> {
    let record = CandidateRecord {
        url: url.to_string(),
        title: String::new(),
        content,
        raw_date: String::new(),
        source_id: source_id.to_string(),
        confidence,
        fetched_at: Utc::now(),
    };
    if record.is_blank() { None } else { Some(record) }
}

/// Join the text of every container match in the rendered markup.
fn container_text(html: &str, container: &str) -> Result<String, ScrapeError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(container)
        .map_err(|e| ScrapeError::Parse(format!("bad selector `{container}`: {e}")))?;
    let joined = document
        .select(&selector)
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    Ok(joined)
}

/// Full visible text of the rendered page body.
fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body = Selector::parse("body").unwrap();
    document
        .select(&body)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .unwrap_or_default()
}
