// src/ingest/types.rs
use anyhow::Result;

/// One ingested news item. Created by the fetcher, enriched in place after
/// the LLM stage, read-only for ranking. Lives only for the duration of a run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: String,
    /// Plain text, markup stripped.
    pub summary: String,
    /// Original (possibly HTML) body, retained for prompt rendering.
    pub raw_content: String,
    pub image_url: Option<String>,
    /// Human-readable origin label, e.g. "RSS Feed - indianexpress.com".
    pub source: String,
    #[serde(default)]
    pub classification: Option<Classification>,
}

impl Article {
    /// Deduplication key: first-seen (title, link) wins within a run.
    pub fn dedup_key(&self) -> (String, String) {
        (self.title.clone(), self.link.clone())
    }

    /// Score attached by the scorer, 0 when the article is unclassified.
    pub fn relevance_score(&self) -> u8 {
        self.classification
            .as_ref()
            .map(|c| c.relevance_score)
            .unwrap_or(0)
    }
}

/// LLM judgment about one article plus the deterministic score computed from
/// it. `relevance_score` is never taken from the model.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub is_relevant: bool,
    pub region: String,
    pub content_type: String,
    pub reasoning: String,
    pub relevance_score: u8,
    pub score_breakdown: String,
}

#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Article>>;
    fn name(&self) -> String;
}
