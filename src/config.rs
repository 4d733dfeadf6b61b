// src/config.rs
//! Run configuration: one explicit struct, loaded from TOML once in `main`
//! and passed by parameter. No component reads ambient global state; secrets
//! (API keys, SMTP credentials) come from the environment only.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::ingest::newsapi::DEFAULT_NEWS_API_ENDPOINT;

pub const DEFAULT_CONFIG_PATH: &str = "config/digest.toml";
pub const ENV_CONFIG_PATH: &str = "DIGEST_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub user_filter: UserFilter,
    pub scoring: ScoringConfig,
    pub llm: LlmConfig,
    pub news_api: NewsApiConfig,
    pub delivery: DeliveryConfig,
    pub max_articles: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_filter: UserFilter::default(),
            scoring: ScoringConfig::default(),
            llm: LlmConfig::default(),
            news_api: NewsApiConfig::default(),
            delivery: DeliveryConfig::default(),
            max_articles: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserFilter {
    pub topic: String,
    pub region: String,
    pub content_type: String,
    /// Optional restriction to named registry sources.
    pub sources: Option<Vec<String>>,
}

impl Default for UserFilter {
    fn default() -> Self {
        Self {
            topic: "education".to_string(),
            region: "India".to_string(),
            content_type: "General".to_string(),
            sources: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub batch_size: usize,
    pub min_score: u8,
    pub use_prefilter: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            min_score: 30,
            use_prefilter: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    /// Courtesy pause between batch calls.
    pub batch_pause_ms: u64,
    pub retry_delay_ms: u64,
    pub max_attempts: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            batch_pause_ms: 1_000,
            retry_delay_ms: 1_000,
            max_attempts: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsApiConfig {
    pub endpoint: String,
    pub page_size: u32,
    pub language: String,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_NEWS_API_ENDPOINT.to_string(),
            page_size: 50,
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// "email" | "none"
    pub method: String,
    pub recipients: Vec<String>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            method: "none".to_string(),
            recipients: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing digest config toml")
    }

    /// Load using env var + fallbacks:
    /// 1) $DIGEST_CONFIG_PATH
    /// 2) config/digest.toml
    /// 3) defaults
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content)
                .with_context(|| format!("loading config from {}", path.display())),
            Err(_) => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.scoring.batch_size, 10);
        assert_eq!(cfg.scoring.min_score, 30);
        assert_eq!(cfg.max_articles, 10);
        assert_eq!(cfg.delivery.method, "none");
    }

    #[test]
    fn partial_toml_keeps_defaults_for_the_rest() {
        let cfg = AppConfig::from_toml_str(
            r#"
max_articles = 5

[user_filter]
topic = "technology"
region = "Global"

[scoring]
min_score = 60
"#,
        )
        .unwrap();
        assert_eq!(cfg.max_articles, 5);
        assert_eq!(cfg.user_filter.topic, "technology");
        assert_eq!(cfg.user_filter.region, "Global");
        // Untouched sections fall back to defaults.
        assert_eq!(cfg.user_filter.content_type, "General");
        assert_eq!(cfg.scoring.min_score, 60);
        assert_eq!(cfg.scoring.batch_size, 10);
        assert_eq!(cfg.llm.model, "gemini-2.5-flash");
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(AppConfig::from_toml_str("max_articles = \"ten\"").is_err());
    }
}
