//! Data models for sources, extracted records, and classification results.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`SourceConfig`]: one scrape target with its selectors and metadata
//! - [`CandidateRecord`]: an extracted listing, prior to classification
//! - [`Classification`] / [`ClassifiedRecord`]: the LLM-attached verdict
//!
//! Source configuration is static data; all of its string fields are
//! `&'static str` so the built-in table can live in a `static`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Broad origin category of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceCategory {
    International,
    Regional,
    National,
    Ngo,
}

/// How often a source is expected to publish new listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateFrequency {
    Daily,
    Weekly,
    Monthly,
}

/// CSS selectors identifying the structural regions of a listing page.
///
/// `container` matches one element per listing; the remaining selectors are
/// evaluated relative to each container match.
#[derive(Debug, Clone, Copy)]
pub struct Selectors {
    pub container: &'static str,
    pub title: &'static str,
    pub content: &'static str,
    pub date: &'static str,
    pub link: &'static str,
}

/// One scrape target: URL, display metadata, and extraction selectors.
///
/// Defined once at process start and never mutated. Every entry must have a
/// non-empty `url` and `selectors.container`.
#[derive(Debug, Clone, Copy)]
pub struct SourceConfig {
    /// Unique registry key, e.g. `"afdb"`.
    pub id: &'static str,
    pub url: &'static str,
    pub display_name: &'static str,
    pub category: SourceCategory,
    /// Higher is more important; drives bulk-run ordering.
    pub priority: u8,
    pub update_frequency: UpdateFrequency,
    /// Whether the listing content only appears after script execution.
    pub requires_rendering: bool,
    pub selectors: Selectors,
}

/// How much trust to place in the extraction method that produced a record.
///
/// Selector-driven extraction is `High`; a successful page render without
/// itemized selectors is `Medium`; the keyword fallback and the raw-body
/// minimal fetch are `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// One extracted listing, not yet classified.
///
/// Emitted by an extractor only when `title` or `content` is non-empty.
/// `url` is always absolute: relative links are resolved against the origin
/// of the page they were found on before the record is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Absolute link to the listing (or the page URL when no link was found).
    pub url: String,
    /// Listing title, possibly empty for page-level extractions.
    pub title: String,
    /// Free text: title, body, and date concatenated as available.
    pub content: String,
    /// Unparsed date text as it appeared on the page.
    pub raw_date: String,
    /// Registry id of the source this record came from.
    pub source_id: String,
    pub confidence: Confidence,
    /// Moment of extraction.
    pub fetched_at: DateTime<Utc>,
}

impl CandidateRecord {
    /// True when the record carries no usable text at all. Such fragments
    /// are discarded by the extractors and never emitted.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}

/// Sector buckets the classifier assigns listings to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Energy,
    Agriculture,
    Water,
    Other,
}

/// The classifier's verdict for one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub relevant: bool,
    pub sector: Sector,
    /// 0-100; values above 100 from the model are clamped on parse.
    pub relevance_score: u8,
    /// Application deadline as an ISO date string, when the model found one.
    #[serde(default)]
    pub deadline: Option<String>,
}

/// A record after the classification pass.
///
/// `classification` is `None` when classification was skipped or failed for
/// this record; the record itself is still persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub record: CandidateRecord,
    pub classification: Option<Classification>,
}
