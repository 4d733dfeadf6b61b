// src/classify/mod.rs
pub mod client;
pub mod parse;
pub mod prompt;
pub mod score;

use std::time::Duration;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::classify::client::LlmClient;
use crate::classify::parse::parse_batch_response;
use crate::classify::prompt::{build_batches, render_prompt, FILTER_PROMPT_TEMPLATE};
use crate::classify::score::score_classification;
use crate::ingest::types::{Article, Classification};
use crate::lexicon::INDIA_MARKERS;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("classify_batches_total", "LLM batches submitted.");
        describe_counter!(
            "classify_batch_failures_total",
            "Batches discarded for call or parse failure."
        );
        describe_counter!("classify_scored_total", "Articles scored and retained.");
        describe_counter!(
            "classify_below_threshold_total",
            "Scored articles dropped below min_score."
        );
        describe_counter!(
            "classify_prefiltered_total",
            "Articles removed by the region pre-filter."
        );
    });
}

#[derive(Debug, Clone)]
pub struct ClassifyConfig {
    pub batch_size: usize,
    pub min_score: u8,
    pub use_prefilter: bool,
    /// Region used by the pre-filter and passed through to the prompt topic
    /// context; "india" and "global" activate the pre-filter.
    pub region: String,
    /// Courtesy pause between batch calls.
    pub batch_pause: Duration,
}

/// True when the article's link or source carries an India marker.
pub fn is_probably_indian(article: &Article, markers: &[&str]) -> bool {
    let link = article.link.to_lowercase();
    let source = article.source.to_lowercase();
    markers.iter().any(|k| link.contains(k) || source.contains(k))
}

/// Cheap region pre-filter applied before any batch is built: "india" keeps
/// marker matches, "global" keeps the complement, anything else keeps all.
pub fn prefilter_by_region(articles: Vec<Article>, region: &str) -> Vec<Article> {
    match region.to_lowercase().as_str() {
        "india" => articles
            .into_iter()
            .filter(|a| is_probably_indian(a, INDIA_MARKERS))
            .collect(),
        "global" => articles
            .into_iter()
            .filter(|a| !is_probably_indian(a, INDIA_MARKERS))
            .collect(),
        _ => articles,
    }
}

/// Classify articles in fixed-size batches and attach deterministic scores.
/// A batch whose LLM call or parse fails is discarded whole — its articles
/// receive no classification and drop out of the result. Articles scoring
/// below `min_score` are dropped as expected filtering.
pub async fn classify_and_score(
    articles: Vec<Article>,
    topic: &str,
    cfg: &ClassifyConfig,
    llm: &dyn LlmClient,
) -> Vec<Article> {
    ensure_metrics_described();

    let articles = if cfg.use_prefilter {
        let before = articles.len();
        let kept = prefilter_by_region(articles, &cfg.region);
        counter!("classify_prefiltered_total").increment((before - kept.len()) as u64);
        kept
    } else {
        articles
    };

    if articles.is_empty() {
        tracing::info!(target: "classify", "no articles left before classification");
        return Vec::new();
    }

    let batches = build_batches(&articles, cfg.batch_size);
    let batch_count = batches.len();
    let mut results = Vec::new();

    for (idx, batch) in batches.into_iter().enumerate() {
        counter!("classify_batches_total").increment(1);
        tracing::info!(
            target: "classify",
            batch = idx + 1,
            of = batch_count,
            size = batch.len(),
            "classifying batch"
        );

        let prompt = render_prompt(batch, topic, FILTER_PROMPT_TEMPLATE);
        let response = llm.complete(&prompt).await.unwrap_or_default();

        if response.is_empty() {
            tracing::warn!(target: "classify", batch = idx + 1, "llm call failed, batch skipped");
            counter!("classify_batch_failures_total").increment(1);
        } else {
            match parse_batch_response(&response, batch.len()) {
                Ok(parsed) => {
                    for (article, raw) in batch.iter().zip(parsed) {
                        let (relevance_score, score_breakdown) =
                            score_classification(&raw, topic);

                        if relevance_score < cfg.min_score {
                            tracing::debug!(
                                target: "classify",
                                score = relevance_score,
                                title = %article.title,
                                "below threshold"
                            );
                            counter!("classify_below_threshold_total").increment(1);
                            continue;
                        }

                        let mut scored = article.clone();
                        scored.classification = Some(Classification {
                            is_relevant: raw.is_relevant,
                            region: raw.region,
                            content_type: raw.content_type,
                            reasoning: raw.reasoning,
                            relevance_score,
                            score_breakdown,
                        });
                        counter!("classify_scored_total").increment(1);
                        results.push(scored);
                    }
                }
                Err(e) => {
                    tracing::warn!(target: "classify", batch = idx + 1, error = %e, "batch skipped");
                    counter!("classify_batch_failures_total").increment(1);
                }
            }
        }

        // Rate-limit courtesy toward the completion service.
        if idx + 1 < batch_count && !cfg.batch_pause.is_zero() {
            tokio::time::sleep(cfg.batch_pause).await;
        }
    }

    results
}
