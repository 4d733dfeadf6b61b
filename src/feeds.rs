// src/feeds.rs
//! Static feed registry: named RSS sources grouped by topic and region, plus
//! "general" sources appended to every combination.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_FEEDS_CONFIG_PATH: &str = "config/feeds.toml";
pub const ENV_FEEDS_CONFIG_PATH: &str = "FEEDS_CONFIG_PATH";

/// Topic value marking a source as always-included.
pub const GENERAL_TOPIC: &str = "general";

/// Registry shipped with the binary; a config file only overrides it.
const BUILTIN_FEEDS_TOML: &str = include_str!("../config/feeds.toml");

/// Immutable registry entry, loaded once.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
    pub topic: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedRegistry {
    #[serde(rename = "feeds", default)]
    feeds: Vec<FeedSource>,
}

impl FeedRegistry {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let reg: FeedRegistry = toml::from_str(s).context("parsing feed registry toml")?;
        Ok(reg)
    }

    /// Registry compiled into the binary.
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_FEEDS_TOML).expect("builtin feed registry parses")
    }

    /// Load using env var + fallbacks:
    /// 1) $FEEDS_CONFIG_PATH
    /// 2) config/feeds.toml
    /// 3) built-in registry
    pub fn load() -> Self {
        let path = std::env::var(ENV_FEEDS_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_FEEDS_CONFIG_PATH));

        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(reg) => reg,
                Err(e) => {
                    tracing::warn!(error = ?e, path = %path.display(), "bad feed registry, using builtin");
                    Self::builtin()
                }
            },
            Err(_) => Self::builtin(),
        }
    }

    pub fn all(&self) -> &[FeedSource] {
        &self.feeds
    }

    /// Topic/region-specific sources followed by the general sources, in
    /// registry order. The optional name filter restricts both groups.
    /// Unknown topic or region yields only the general sources.
    pub fn feeds_for(
        &self,
        topic: &str,
        region: &str,
        name_filter: Option<&HashSet<String>>,
    ) -> Vec<FeedSource> {
        let selected = |f: &FeedSource| name_filter.map_or(true, |set| set.contains(&f.name));

        let topical = self.feeds.iter().filter(|f| {
            f.topic.eq_ignore_ascii_case(topic)
                && f.region.eq_ignore_ascii_case(region)
                && !f.topic.eq_ignore_ascii_case(GENERAL_TOPIC)
        });
        let general = self
            .feeds
            .iter()
            .filter(|f| f.topic.eq_ignore_ascii_case(GENERAL_TOPIC));

        topical
            .chain(general)
            .filter(|f| selected(f))
            .cloned()
            .collect()
    }
}
