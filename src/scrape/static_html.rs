//! Static extraction: plain HTTP fetch plus selector-driven parsing.
//!
//! One GET per call, no retry at this layer (retry-by-strategy-swap belongs
//! to the orchestrator). The configured selector pass itemizes listings per
//! container element; when it matches nothing, a generic fallback pass scans
//! broad structural elements for opportunity-flavored text instead.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::ScrapeError;
use crate::models::{CandidateRecord, Confidence, Selectors};
use crate::scrape::{Extract, GENERIC_SELECTORS, resolve_link};
use crate::sources::SourceRegistry;
use crate::utils::{collapse_whitespace, truncate_chars};

/// Elements shorter than this are skipped by the generic fallback pass.
const FALLBACK_MIN_TEXT_CHARS: usize = 100;
/// Fallback records carry at most this much content.
const FALLBACK_MAX_CONTENT_CHARS: usize = 1000;

/// Words that mark an element as a plausible opportunity listing.
static FALLBACK_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(opportunity|grant|funding|tender|project|proposal|application)\b")
        .expect("fallback keyword pattern is valid")
});

/// Fetches a URL over plain HTTP and extracts listings with the source's
/// configured selectors, or [`GENERIC_SELECTORS`] for unknown sources.
pub struct StaticExtractor {
    client: reqwest::Client,
    registry: Arc<SourceRegistry>,
}

impl StaticExtractor {
    pub fn new(registry: Arc<SourceRegistry>, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self { client, registry }
    }
}

impl Extract for StaticExtractor {
    #[instrument(level = "info", skip(self))]
    async fn extract(
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
        debug!(bytes = body.len(), "Fetched page body");

        let page_url =
            Url::parse(url).map_err(|e| ScrapeError::Parse(format!("invalid page URL: {e}")))?;
        let selectors = self
            .registry
            .get(source_id)
            .map(|s| s.selectors)
            .unwrap_or(GENERIC_SELECTORS);

        let records = parse_listings(&body, &page_url, &selectors, source_id)?;
        if !records.is_empty() {
            info!(count = records.len(), "Extracted listings via selectors");
            return Ok(records);
        }

        warn!("Configured selectors matched nothing; running generic fallback pass");
        let fallback = generic_fallback(&body, &page_url, source_id);
        info!(count = fallback.len(), "Generic fallback pass finished");
        Ok(fallback)
    }
}

/// Selector-driven pass: one record per container match, in document order.
///
/// Title, content, and date are the trimmed text of the first sub-element
/// match; the link is the container's first matching anchor, resolved against
/// the page origin, defaulting to the page URL itself. Containers with
/// neither title nor content text are dropped.
pub(crate) fn parse_listings(
    html: &str,
    page_url: &Url,
    selectors: &Selectors,
    source_id: &str,
) -> Result<Vec<CandidateRecord>, ScrapeError> {
    let document = Html::parse_document(html);
    let container = parse_selector(selectors.container)?;
    let title_sel = parse_selector(selectors.title)?;
    let content_sel = parse_selector(selectors.content)?;
    let date_sel = parse_selector(selectors.date)?;
    let link_sel = parse_selector(selectors.link)?;

    let mut records = Vec::new();
    for element in document.select(&container) {
        let title = first_match_text(&element, &title_sel);
        let body = first_match_text(&element, &content_sel);
        let date = first_match_text(&element, &date_sel);
        if title.is_empty() && body.is_empty() {
            continue;
        }

        let link = element
            .select(&link_sel)
            .find_map(|a| a.value().attr("href"))
            .map(|href| resolve_link(page_url, href))
            .unwrap_or_else(|| page_url.to_string());

        let content = [title.as_str(), body.as_str(), date.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n");

        records.push(CandidateRecord {
            url: link,
            title,
            content,
            raw_date: date,
            source_id: source_id.to_string(),
            confidence: Confidence::High,
            fetched_at: Utc::now(),
        });
    }
    Ok(records)
}

/// Generic fallback pass over broad structural elements.
///
/// Emits one low-confidence record for every div/article/section whose
/// visible text is longer than [`FALLBACK_MIN_TEXT_CHARS`] and contains at
/// least one keyword. Content is capped at [`FALLBACK_MAX_CONTENT_CHARS`];
/// the link defaults to the page URL when the element has no anchor.
pub(crate) fn generic_fallback(
    html: &str,
    page_url: &Url,
    source_id: &str,
) -> Vec<CandidateRecord> {
    let document = Html::parse_document(html);
    let broad = Selector::parse("div, article, section").unwrap();
    let anchor = Selector::parse("a[href]").unwrap();

    let mut records = Vec::new();
    for element in document.select(&broad) {
        let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
        if text.chars().count() <= FALLBACK_MIN_TEXT_CHARS || !FALLBACK_KEYWORDS.is_match(&text) {
            continue;
        }

        let link = element
            .select(&anchor)
            .find_map(|a| a.value().attr("href"))
            .map(|href| resolve_link(page_url, href))
            .unwrap_or_else(|| page_url.to_string());

        records.push(CandidateRecord {
            url: link,
            title: String::new(),
            content: truncate_chars(&text, FALLBACK_MAX_CONTENT_CHARS),
            raw_date: String::new(),
            source_id: source_id.to_string(),
            confidence: Confidence::Low,
            fetched_at: Utc::now(),
        });
    }
    records
}

fn parse_selector(expr: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(expr).map_err(|e| ScrapeError::Parse(format!("bad selector `{expr}`: {e}")))
}

fn first_match_text(element: &ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .unwrap_or_default()
}
