//! News Digest — Binary Entrypoint
//! Runs one fetch → classify → rank pass and optionally emails the result.
//!
//! Configuration comes from `config/digest.toml` (see `DIGEST_CONFIG_PATH`);
//! secrets come from the environment: NEWS_API_KEY, GEMINI_API_KEY, SMTP_*.

use std::time::Duration;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_digest::classify::client::{GeminiClient, RetryingClient};
use news_digest::config::AppConfig;
use news_digest::feeds::FeedRegistry;
use news_digest::ingest::newsapi::ENV_NEWS_API_KEY;
use news_digest::notify::email::EmailSender;
use news_digest::notify::digest_items;
use news_digest::pipeline::{run_digest, DigestRun};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Post-run analytics: stage counts and score distribution, as structured
/// log fields.
fn log_run_summary(run: &DigestRun) {
    let scores: Vec<u8> = run.articles.iter().map(|a| a.relevance_score()).collect();
    let excellent = scores.iter().filter(|s| **s >= 80).count();
    let good = scores.iter().filter(|s| (60..80).contains(*s)).count();
    let average = scores.iter().filter(|s| (40..60).contains(*s)).count();
    let below = scores.iter().filter(|s| **s < 40).count();

    tracing::info!(
        target: "pipeline",
        fetched = run.fetched,
        classified = run.classified,
        ranked = run.articles.len(),
        excellent,
        good,
        average,
        below,
        "run summary"
    );

    for (i, a) in run.articles.iter().enumerate() {
        let breakdown = a
            .classification
            .as_ref()
            .map(|c| c.score_breakdown.as_str())
            .unwrap_or_default();
        tracing::info!(
            target: "pipeline",
            rank = i + 1,
            score = a.relevance_score(),
            title = %a.title,
            link = %a.link,
            source = %a.source,
            breakdown = %breakdown,
            "top article"
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load()?;
    let registry = FeedRegistry::load();

    let llm = RetryingClient::new(
        GeminiClient::new(&cfg.llm.model),
        cfg.llm.max_attempts,
        Duration::from_millis(cfg.llm.retry_delay_ms),
    );
    let news_api_key = std::env::var(ENV_NEWS_API_KEY).ok();
    if news_api_key.is_none() {
        tracing::warn!("NEWS_API_KEY not set; skipping the news-search API");
    }

    let run = run_digest(&cfg, &registry, &llm, news_api_key.as_deref()).await;
    log_run_summary(&run);

    if run.is_empty() {
        tracing::info!("no articles matched the filter criteria today; nothing to deliver");
        return Ok(());
    }

    if cfg.delivery.method.eq_ignore_ascii_case("email") {
        let items = digest_items(&run.articles);
        match EmailSender::from_env() {
            Ok(sender) => {
                if let Err(e) = sender
                    .send_digest(&items, &cfg.user_filter.topic, &cfg.delivery.recipients)
                    .await
                {
                    tracing::warn!(error = ?e, "digest email failed");
                }
            }
            Err(e) => tracing::warn!(error = ?e, "email delivery not configured"),
        }
    }

    Ok(())
}
