//! Typed error kinds for the scrape and classify stages.
//!
//! "No records found" is deliberately not an error: extractors model it as
//! an empty vec so the orchestrator can treat failure and emptiness the same
//! way when deciding on a fallback attempt.

use thiserror::Error;

/// What went wrong while fetching or extracting a page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The plain HTTP fetch itself failed (network, timeout, bad status).
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The rendering backend refused or failed to produce markup.
    #[error("render failed: {0}")]
    Render(String),

    /// The fetched markup could not be parsed or selected against.
    #[error("parse failed: {0}")]
    Parse(String),
}

/// What went wrong while classifying a record.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The classification request never produced a response.
    #[error("classification request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("classification API returned status {0}")]
    Status(u16),

    /// The model's verdict was not the expected JSON shape.
    #[error("malformed verdict: {0}")]
    Malformed(String),
}
