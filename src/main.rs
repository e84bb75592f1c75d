//! # Sustain Scout
//!
//! A scraping pipeline that discovers sustainability-related funding and
//! procurement opportunities from a fixed set of known web sources, classifies
//! each extracted listing with an LLM, and writes the results as JSON.
//!
//! ## Architecture
//!
//! The pipeline runs in four stages:
//! 1. **Resolution**: the source registry maps ids to URLs, selectors, and a
//!    strategy hint
//! 2. **Extraction**: a static (plain HTTP + selectors) or rendered (headless
//!    browser) strategy pulls candidate records out of each page, rate-limited
//!    and with one fallback swap to the other strategy
//! 3. **Classification**: an OpenAI-compatible model tags each record with
//!    relevance, sector, score, and deadline
//! 4. **Output**: classified records land in a dated JSON run report
//!
//! ## Usage
//!
//! ```sh
//! sustain_scout --source afdb
//! sustain_scout --source afdb,unep --json-output-dir ./out
//! sustain_scout --all --limit 3 --force-static
//! ```

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::Cli;
use sustain_scout::classify::{self, OpenAiClassifier};
use sustain_scout::config::AppConfig;
use sustain_scout::orchestrator::{Orchestrator, RuntimeEnv, ScrapeTarget};
use sustain_scout::outputs::json::{RunReport, write_run_report};
use sustain_scout::scrape::browserless::BrowserlessClient;
use sustain_scout::scrape::rendered::RenderedExtractor;
use sustain_scout::scrape::static_html::StaticExtractor;
use sustain_scout::sources::SourceRegistry;
use sustain_scout::utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("sustain_scout starting up");

    let args = Cli::parse();
    debug!(?args.source, all = args.all, ?args.limit, "Parsed CLI arguments");

    // --- Config: file values, then CLI/env overrides ---
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(ref user_agent) = args.user_agent {
        config.user_agent = user_agent.clone();
    }
    if let Some(ref browserless_url) = args.browserless_url {
        config.browserless_url = Some(browserless_url.clone());
    }

    // Early check: ensure the output dir is writable before any network work.
    ensure_writable_dir(&args.json_output_dir).await?;

    // --- Pipeline assembly ---
    let registry = Arc::new(SourceRegistry::builtin());
    info!(sources = registry.len(), "Source registry loaded");

    let browserless = match (&config.browserless_url, config.constrained_runtime) {
        (Some(url), false) => Some(BrowserlessClient::new(
            url,
            config.browserless_token.as_deref(),
        )),
        _ => None,
    };
    let can_render = browserless.is_some();
    if !can_render {
        info!("Rendering unavailable; all sources will use static extraction first");
    }

    let static_extractor = StaticExtractor::new(Arc::clone(&registry), &config.user_agent);
    let rendered_extractor = RenderedExtractor::new(
        Arc::clone(&registry),
        browserless,
        &config.user_agent,
        config.constrained_runtime,
    );
    let env = RuntimeEnv {
        can_render,
        force_static: args.force_static,
    };
    let orchestrator = Orchestrator::new(
        Arc::clone(&registry),
        static_extractor,
        rendered_extractor,
        env,
    );

    // --- Scrape ---
    let target = match args.source.as_deref() {
        Some(list) => ScrapeTarget::from_list(list),
        None => ScrapeTarget::All { limit: args.limit },
    };
    let covered = orchestrator.resolved_ids(&target);
    info!(sources = ?covered, "Starting scrape run");

    let records = orchestrator.run_many(&target).await;
    info!(count = records.len(), "Extraction finished");

    // --- Classify ---
    let classified = match (&args.openai_api_key, args.skip_classify) {
        (Some(api_key), false) => {
            let classifier = OpenAiClassifier::new(&config.openai_base_url, api_key, &config.model);
            classify::classify_records(&classifier, records).await
        }
        (None, false) => {
            warn!("No API key configured; skipping classification");
            classify::skip_classification(records)
        }
        (_, true) => {
            info!("Classification skipped by request");
            classify::skip_classification(records)
        }
    };

    // --- Output ---
    let report = RunReport::new(covered, classified);
    let path = write_run_report(&report, &args.json_output_dir).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        records = report.record_count,
        path = %path,
        "Execution complete"
    );

    Ok(())
}
