//! Scrape orchestration: strategy selection, rate limiting, and the
//! one-shot-primary / one-shot-fallback control flow.
//!
//! Per source and call the state machine is:
//!
//! ```text
//! PRIMARY_ATTEMPT -> success-with-results -> DONE
//!                 -> empty-or-error       -> FALLBACK_ATTEMPT
//! FALLBACK_ATTEMPT -> success-with-results -> DONE
//!                  -> empty-or-error       -> DONE (empty)
//! ```
//!
//! Total attempts are capped at two; a source that fails both ways yields an
//! empty record set, never an error, so one dead site cannot abort a bulk
//! run. Bulk mode walks sources strictly sequentially to avoid hammering
//! target sites in parallel.

use std::sync::Arc;
use std::time::Duration;

use itertools::Itertools;
use tracing::{info, instrument, warn};

use crate::error::ScrapeError;
use crate::models::{CandidateRecord, SourceConfig};
use crate::rate_limit::RateLimiter;
use crate::scrape::{Extract, Strategy};
use crate::sources::SourceRegistry;

/// Minimum spacing between fetches of the same strategy.
pub const MIN_FETCH_INTERVAL: Duration = Duration::from_millis(1000);

/// Hard cap on sources per bulk invocation.
pub const MAX_SOURCES_PER_RUN: usize = 5;

/// What a bulk run should cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeTarget {
    /// Top sources by priority, optionally narrowed below the
    /// [`MAX_SOURCES_PER_RUN`] cap.
    All { limit: Option<usize> },
    /// An explicit list of source ids, run in the given order.
    List(Vec<String>),
}

impl ScrapeTarget {
    /// Parse a comma-separated id list as handed in on the command line.
    pub fn from_list(arg: &str) -> Self {
        ScrapeTarget::List(
            arg.split(',')
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
        )
    }
}

/// Environment facts the orchestrator needs to pick a strategy.
///
/// Passed in at construction so behavior is deterministic and testable; the
/// orchestrator never inspects process environment state itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeEnv {
    /// The runtime can actually render (not constrained, endpoint present).
    pub can_render: bool,
    /// Operator override: always extract statically.
    pub force_static: bool,
}

/// Drives one or more sources through the extraction state machine.
///
/// Each strategy gets its own [`RateLimiter`], so consecutive fetches through
/// the same strategy are spaced by [`MIN_FETCH_INTERVAL`] while the two
/// strategies stay independent of each other.
pub struct Orchestrator<S, R> {
    registry: Arc<SourceRegistry>,
    static_extractor: S,
    rendered_extractor: R,
    static_limiter: RateLimiter,
    rendered_limiter: RateLimiter,
    env: RuntimeEnv,
}

impl<S: Extract, R: Extract> Orchestrator<S, R> {
    pub fn new(
        registry: Arc<SourceRegistry>,
        static_extractor: S,
        rendered_extractor: R,
        env: RuntimeEnv,
    ) -> Self {
        Self {
            registry,
            static_extractor,
            rendered_extractor,
            static_limiter: RateLimiter::new(MIN_FETCH_INTERVAL),
            rendered_limiter: RateLimiter::new(MIN_FETCH_INTERVAL),
            env,
        }
    }

    /// Pick the primary strategy for a source, computed once per call.
    ///
    /// Rendering is primary only when the source asks for it and the runtime
    /// permits it; the force-static override beats everything.
    fn choose_strategy(&self, source: Option<&SourceConfig>) -> Strategy {
        if self.env.force_static || !self.env.can_render {
            return Strategy::Static;
        }
        match source {
            Some(s) if s.requires_rendering => Strategy::Rendered,
            _ => Strategy::Static,
        }
    }

    async fn attempt(
        &self,
        strategy: Strategy,
        source_id: &str,
        url: &str,
    ) -> Result<Vec<CandidateRecord>, ScrapeError> {
        match strategy {
            Strategy::Static => {
                self.static_limiter.throttle().await;
                self.static_extractor.extract(source_id, url).await
            }
            Strategy::Rendered => {
                self.rendered_limiter.throttle().await;
                self.rendered_extractor.extract(source_id, url).await
            }
        }
    }

    /// Scrape one source: primary strategy, then at most one fallback swap.
    ///
    /// Both failure and "zero records" trigger the swap; a double miss
    /// returns an empty vec, reported but non-fatal.
    #[instrument(level = "info", skip(self))]
    pub async fn run(&self, source_id: &str) -> Vec<CandidateRecord> {
        let url = self.registry.resolve_url(source_id);
        let primary = self.choose_strategy(self.registry.get(source_id));

        match self.attempt(primary, source_id, &url).await {
            Ok(records) if !records.is_empty() => {
                info!(strategy = %primary, count = records.len(), "Primary strategy succeeded");
                return records;
            }
            Ok(_) => info!(strategy = %primary, "Primary strategy returned no records"),
            Err(e) => warn!(strategy = %primary, error = %e, "Primary strategy failed"),
        }

        let fallback = primary.other();
        match self.attempt(fallback, source_id, &url).await {
            Ok(records) if !records.is_empty() => {
                info!(strategy = %fallback, count = records.len(), "Fallback strategy succeeded");
                records
            }
            Ok(_) => {
                info!(strategy = %fallback, "Both strategies returned no records");
                Vec::new()
            }
            Err(e) => {
                warn!(strategy = %fallback, error = %e, "Both strategies failed");
                Vec::new()
            }
        }
    }

    /// The source ids a target expands to, in invocation order.
    ///
    /// `All` takes the top sources by priority, capped at
    /// [`MAX_SOURCES_PER_RUN`]; an explicit list runs as given. This is the
    /// exact set [`Orchestrator::run_many`] walks, exposed so callers can
    /// report coverage without re-deriving the cap.
    pub fn resolved_ids(&self, target: &ScrapeTarget) -> Vec<String> {
        match target {
            ScrapeTarget::All { limit } => {
                let n = limit
                    .unwrap_or(MAX_SOURCES_PER_RUN)
                    .min(MAX_SOURCES_PER_RUN);
                self.registry
                    .list_by_priority_descending()
                    .into_iter()
                    .take(n)
                    .map(|s| s.id.to_string())
                    .collect()
            }
            ScrapeTarget::List(ids) => ids.clone(),
        }
    }

    /// Scrape several sources strictly sequentially, concatenating results
    /// in source order and dropping duplicate record URLs.
    #[instrument(level = "info", skip(self))]
    pub async fn run_many(&self, target: &ScrapeTarget) -> Vec<CandidateRecord> {
        let ids = self.resolved_ids(target);

        let mut all_records = Vec::new();
        for id in &ids {
            let records = self.run(id).await;
            info!(source = %id, count = records.len(), "Source finished");
            all_records.extend(records);
        }

        let records: Vec<CandidateRecord> = all_records
            .into_iter()
            .unique_by(|r| r.url.clone())
            .collect();
        info!(sources = ids.len(), count = records.len(), "Bulk run finished");
        records
    }
}
