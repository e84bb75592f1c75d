//! Command-line interface definitions.
//!
//! The three invocation shapes all funnel into the orchestrator: a single
//! source id, a comma-separated id list, or `--all` for the top sources by
//! priority. Secrets and endpoints can come from the environment instead of
//! flags.

use clap::Parser;

/// Command-line arguments for the Sustain Scout scraper.
///
/// # Examples
///
/// ```sh
/// # One source
/// sustain_scout --source afdb
///
/// # Several sources in order
/// sustain_scout --source afdb,unep,kenya
///
/// # Top sources by priority
/// sustain_scout --all --limit 3
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Source id, comma-separated id list, or a full URL to scrape
    #[arg(short, long, conflicts_with = "all")]
    pub source: Option<String>,

    /// Scrape all known sources in priority order
    #[arg(long)]
    pub all: bool,

    /// Narrow how many sources --all covers (capped at 5)
    #[arg(long, requires = "all")]
    pub limit: Option<usize>,

    /// Force static extraction regardless of source metadata
    #[arg(long)]
    pub force_static: bool,

    /// Skip LLM classification; records are written unclassified
    #[arg(long)]
    pub skip_classify: bool,

    /// Output directory for the JSON run report
    #[arg(short, long, default_value = "./out")]
    pub json_output_dir: String,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// API key for the classification model
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Browserless rendering endpoint, e.g. http://localhost:3000
    #[arg(long, env = "BROWSERLESS_URL")]
    pub browserless_url: Option<String>,

    /// Override the scraper's User-Agent header
    #[arg(long, env = "SCRAPER_USER_AGENT")]
    pub user_agent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_source() {
        let cli = Cli::parse_from(&["sustain_scout", "--source", "afdb"]);
        assert_eq!(cli.source.as_deref(), Some("afdb"));
        assert!(!cli.all);
        assert_eq!(cli.json_output_dir, "./out");
    }

    #[test]
    fn test_comma_list_source() {
        let cli = Cli::parse_from(&["sustain_scout", "-s", "afdb,unep,kenya"]);
        assert_eq!(cli.source.as_deref(), Some("afdb,unep,kenya"));
    }

    #[test]
    fn test_all_with_limit() {
        let cli = Cli::parse_from(&["sustain_scout", "--all", "--limit", "3"]);
        assert!(cli.all);
        assert_eq!(cli.limit, Some(3));
    }

    #[test]
    fn test_source_conflicts_with_all() {
        let result = Cli::try_parse_from(&["sustain_scout", "--source", "afdb", "--all"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_force_static_flag() {
        let cli = Cli::parse_from(&["sustain_scout", "--all", "--force-static"]);
        assert!(cli.force_static);
    }
}
