//! Application configuration loaded from a YAML file.
//!
//! Everything here has a sensible default, so running without a config file
//! works. CLI flags and env-backed arguments override file values in `main`;
//! nothing below this layer reads process environment state, which keeps the
//! orchestrator deterministic under test.

use serde::Deserialize;
use std::error::Error;
use tracing::info;

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; SustainScout/0.1)".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4-turbo".to_string()
}

/// Runtime configuration for the scrape pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Identifying header sent with every plain HTTP fetch.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Set when the runtime cannot launch or reach a browser at all
    /// (serverless and similar constrained environments). Authoritative:
    /// rendering is never attempted when this is on.
    #[serde(default)]
    pub constrained_runtime: bool,

    /// Base URL of a Browserless rendering service, e.g.
    /// `http://localhost:3000`. Rendering is unavailable without one.
    #[serde(default)]
    pub browserless_url: Option<String>,

    #[serde(default)]
    pub browserless_token: Option<String>,

    /// OpenAI-compatible API root for classification.
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            constrained_runtime: false,
            browserless_url: None,
            browserless_token: None,
            openai_base_url: default_openai_base_url(),
            model: default_model(),
        }
    }
}

impl AppConfig {
    /// Load config from a YAML file, or defaults when no path is given.
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                let config: AppConfig = serde_yaml::from_str(&raw)?;
                info!(path, "Loaded configuration");
                Ok(config)
            }
            None => Ok(AppConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = AppConfig::default();
        assert!(config.user_agent.contains("SustainScout"));
        assert!(!config.constrained_runtime);
        assert!(config.browserless_url.is_none());
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let yaml = "constrained_runtime: true\nbrowserless_url: http://localhost:3000\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.constrained_runtime);
        assert_eq!(
            config.browserless_url.as_deref(),
            Some("http://localhost:3000")
        );
        assert_eq!(config.model, "gpt-4-turbo");
    }
}
