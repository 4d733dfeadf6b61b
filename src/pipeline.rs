// src/pipeline.rs
//! End-to-end digest run: fetch → classify + score → rank. Every stage
//! degrades to "fewer results" — an empty outcome is reported, never raised.

use std::collections::HashSet;
use std::time::Duration;

use crate::classify::client::LlmClient;
use crate::classify::{classify_and_score, ClassifyConfig};
use crate::config::AppConfig;
use crate::feeds::FeedRegistry;
use crate::ingest::newsapi::NewsApiSource;
use crate::ingest::rss::RssFeedSource;
use crate::ingest::types::{Article, ArticleSource};
use crate::ingest::{fetch_articles, http_client};
use crate::rank::{rank_articles, RankCriteria};

/// Outcome of one run, with stage counts for the summary. Empty `articles`
/// is an expected outcome, not an error.
#[derive(Debug)]
pub struct DigestRun {
    pub articles: Vec<Article>,
    pub fetched: usize,
    pub classified: usize,
}

impl DigestRun {
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

/// Run the whole pipeline once. `news_api_key` of `None` skips the
/// news-search API; feed failures are skipped per-source inside the fetcher.
pub async fn run_digest(
    cfg: &AppConfig,
    registry: &FeedRegistry,
    llm: &dyn LlmClient,
    news_api_key: Option<&str>,
) -> DigestRun {
    let topic = &cfg.user_filter.topic;
    let region = &cfg.user_filter.region;

    let name_filter: Option<HashSet<String>> = cfg
        .user_filter
        .sources
        .as_ref()
        .map(|names| names.iter().cloned().collect());

    let feeds = registry.feeds_for(topic, region, name_filter.as_ref());
    tracing::info!(target: "pipeline", topic = %topic, region = %region, feeds = feeds.len(), "starting digest run");

    let client = http_client();
    let rss_sources: Vec<Box<dyn ArticleSource>> = feeds
        .into_iter()
        .map(|f| Box::new(RssFeedSource::from_url(f, client.clone())) as Box<dyn ArticleSource>)
        .collect();

    let api_source = news_api_key.map(|key| {
        NewsApiSource::new(
            client.clone(),
            &cfg.news_api.endpoint,
            key,
            topic,
            &cfg.news_api.language,
            cfg.news_api.page_size,
        )
    });

    let fetched = fetch_articles(
        &rss_sources,
        api_source.as_ref().map(|s| s as &dyn ArticleSource),
    )
    .await;
    let fetched_count = fetched.len();
    if fetched.is_empty() {
        tracing::warn!(target: "pipeline", "no articles fetched; check topic or sources");
        return DigestRun {
            articles: Vec::new(),
            fetched: 0,
            classified: 0,
        };
    }

    let classify_cfg = ClassifyConfig {
        batch_size: cfg.scoring.batch_size,
        min_score: cfg.scoring.min_score,
        use_prefilter: cfg.scoring.use_prefilter,
        region: region.clone(),
        batch_pause: Duration::from_millis(cfg.llm.batch_pause_ms),
    };
    let classified = classify_and_score(fetched, topic, &classify_cfg, llm).await;
    let classified_count = classified.len();
    if classified.is_empty() {
        tracing::warn!(target: "pipeline", fetched = fetched_count, "no articles classified above threshold");
        return DigestRun {
            articles: Vec::new(),
            fetched: fetched_count,
            classified: 0,
        };
    }

    let criteria = RankCriteria {
        region: region.clone(),
        content_type: cfg.user_filter.content_type.clone(),
    };
    let ranked = rank_articles(classified, &criteria, cfg.max_articles);
    if ranked.is_empty() {
        tracing::warn!(
            target: "pipeline",
            classified = classified_count,
            "no articles matched the final criteria"
        );
    }

    DigestRun {
        articles: ranked,
        fetched: fetched_count,
        classified: classified_count,
    }
}
