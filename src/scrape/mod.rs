//! Extraction strategies for turning a fetched page into candidate records.
//!
//! Two strategies exist:
//!
//! - [`static_html::StaticExtractor`]: plain HTTP GET + selector-driven
//!   per-listing extraction, with a keyword-based generic fallback pass
//! - [`rendered::RenderedExtractor`]: script-executing page render via a
//!   Browserless endpoint, producing page-level text, with a minimal plain
//!   fetch as its own internal fallback
//!
//! The orchestrator decides which strategy runs; extractors never inspect the
//! environment or pick strategies themselves. Both implement [`Extract`] so
//! the orchestrator (and its tests) can treat them uniformly.

pub mod browserless;
pub mod rendered;
pub mod static_html;

use std::fmt;

use url::Url;

use crate::error::ScrapeError;
use crate::models::{CandidateRecord, Selectors};

/// The extraction method chosen for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Static,
    Rendered,
}

impl Strategy {
    /// The strategy to fall back to when this one fails or comes up empty.
    pub fn other(self) -> Self {
        match self {
            Strategy::Static => Strategy::Rendered,
            Strategy::Rendered => Strategy::Static,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Static => write!(f, "static"),
            Strategy::Rendered => write!(f, "rendered"),
        }
    }
}

/// An extraction strategy: source id + URL in, candidate records out.
///
/// "No records" is a normal empty result, not an error; errors mean the
/// fetch, render, or parse itself failed.
pub trait Extract {
    async fn extract(&self, source_id: &str, url: &str)
    -> Result<Vec<CandidateRecord>, ScrapeError>;
}

/// Selector set used when a source id has no registry entry: generic item
/// containers, first heading, generic content/date classes, first anchor.
pub const GENERIC_SELECTORS: Selectors = Selectors {
    container: ".item, article, .listing",
    title: "h1, h2, h3",
    content: ".content, .description",
    date: ".date, .deadline",
    link: "a",
};

/// Resolve a link found on a page to an absolute URL.
///
/// Already-absolute links pass through unchanged. Relative links resolve
/// against the *origin* of the fetched page, not its full path: `/foo/bar`
/// becomes `origin + /foo/bar` and `foo/bar` becomes `origin + "/" + foo/bar`.
pub fn resolve_link(page_url: &Url, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    let origin = page_url.origin().ascii_serialization();
    if href.starts_with('/') {
        format!("{origin}{href}")
    } else {
        format!("{origin}/{href}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_other_swaps() {
        assert_eq!(Strategy::Static.other(), Strategy::Rendered);
        assert_eq!(Strategy::Rendered.other(), Strategy::Static);
    }

    #[test]
    fn absolute_links_pass_through() {
        let page = Url::parse("https://example.org/x").unwrap();
        assert_eq!(
            resolve_link(&page, "https://other.org/a/b"),
            "https://other.org/a/b"
        );
    }

    #[test]
    fn rooted_links_resolve_against_origin() {
        let page = Url::parse("https://example.org/x").unwrap();
        assert_eq!(resolve_link(&page, "/foo/bar"), "https://example.org/foo/bar");
    }

    #[test]
    fn bare_relative_links_resolve_against_origin() {
        // Origin-based, so the page path "/x" does not leak into the result.
        let page = Url::parse("https://example.org/x").unwrap();
        assert_eq!(resolve_link(&page, "foo/bar"), "https://example.org/foo/bar");
    }

    #[test]
    fn origin_keeps_the_port() {
        let page = Url::parse("http://localhost:8080/deep/path").unwrap();
        assert_eq!(resolve_link(&page, "/n"), "http://localhost:8080/n");
    }
}
