// src/ingest/mod.rs
pub mod image;
pub mod newsapi;
pub mod rss;
pub mod types;

use std::collections::HashSet;

use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

use crate::ingest::types::{Article, ArticleSource};
use crate::lexicon::TITLE_DENYLIST;

/// RSS entries are capped before the API results are appended.
pub const MAX_RSS_ARTICLES: usize = 200;

/// One-time metrics registration (so series show up on scrapes).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fetch_entries_total", "Entries parsed from sources.");
        describe_counter!(
            "fetch_kept_total",
            "Articles kept after normalization + deduplication."
        );
        describe_counter!(
            "fetch_dedup_total",
            "Articles removed as (title, link) duplicates."
        );
        describe_counter!("fetch_source_errors_total", "Source fetch/parse errors.");
        describe_histogram!("fetch_parse_ms", "Source parse time in milliseconds.");
    });
}

/// Shared HTTP client for feed and API calls.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("news-digest/0.1")
        .connect_timeout(std::time::Duration::from_secs(4))
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Normalize a raw entry title: collapse whitespace and trim, then reject
/// titles outside [10, 200] chars or containing a denylisted boilerplate
/// word (case-insensitive). Returns `None` for rejected titles.
pub fn normalize_title(raw: &str, denylist: &[&str]) -> Option<String> {
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());

    let title = re_ws.replace_all(raw.trim(), " ").to_string();
    let len = title.chars().count();
    if !(10..=200).contains(&len) {
        return None;
    }
    let lower = title.to_lowercase();
    if denylist.iter().any(|w| lower.contains(w)) {
        return None;
    }
    Some(title)
}

/// Title normalization with the default denylist.
pub fn clean_title(raw: &str) -> Option<String> {
    normalize_title(raw, TITLE_DENYLIST)
}

/// Strip markup from a summary/description: decode HTML entities, drop tags,
/// collapse whitespace.
pub fn strip_markup(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Deduplicate by (title, link), first seen wins. Input order is preserved.
pub fn dedup_articles(articles: Vec<Article>) -> (Vec<Article>, usize) {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut unique = Vec::with_capacity(articles.len());
    let mut dropped = 0usize;

    for article in articles {
        if seen.insert(article.dedup_key()) {
            unique.push(article);
        } else {
            dropped += 1;
        }
    }
    (unique, dropped)
}

/// Fetch once from all RSS sources plus the optional news-search API,
/// best-effort: a failing source is logged and skipped, never fatal.
/// RSS results are capped at [`MAX_RSS_ARTICLES`] before the API results are
/// appended; the concatenation is deduplicated first-seen.
pub async fn fetch_articles(
    rss_sources: &[Box<dyn ArticleSource>],
    api_source: Option<&dyn ArticleSource>,
) -> Vec<Article> {
    ensure_metrics_described();

    let mut rss_articles = Vec::new();
    for source in rss_sources {
        match source.fetch().await {
            Ok(mut v) => {
                tracing::debug!(target: "fetch", source = %source.name(), entries = v.len(), "feed parsed");
                rss_articles.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(target: "fetch", error = ?e, source = %source.name(), "feed error");
                counter!("fetch_source_errors_total").increment(1);
            }
        }
    }
    rss_articles.truncate(MAX_RSS_ARTICLES);

    let mut all = rss_articles;
    if let Some(api) = api_source {
        match api.fetch().await {
            Ok(mut v) => {
                tracing::debug!(target: "fetch", source = %api.name(), entries = v.len(), "api queried");
                all.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(target: "fetch", error = ?e, source = %api.name(), "api error");
                counter!("fetch_source_errors_total").increment(1);
            }
        }
    }

    let (unique, dropped) = dedup_articles(all);

    counter!("fetch_kept_total").increment(unique.len() as u64);
    counter!("fetch_dedup_total").increment(dropped as u64);
    tracing::info!(
        target: "fetch",
        kept = unique.len(),
        dedup = dropped,
        "fetch complete"
    );

    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, link: &str) -> Article {
        Article {
            title: title.to_string(),
            link: link.to_string(),
            summary: String::new(),
            raw_content: String::new(),
            image_url: None,
            source: "test".to_string(),
            classification: None,
        }
    }

    #[test]
    fn title_whitespace_is_collapsed() {
        let t = clean_title("  Budget   boosts\tschool funding  ").unwrap();
        assert_eq!(t, "Budget boosts school funding");
    }

    #[test]
    fn short_and_long_titles_are_rejected() {
        assert!(clean_title("Too short").is_none());
        let long = "x".repeat(201);
        assert!(clean_title(&long).is_none());
        // Boundary lengths pass.
        assert!(clean_title(&"y".repeat(10)).is_some());
        assert!(clean_title(&"y".repeat(200)).is_some());
    }

    #[test]
    fn denylisted_titles_are_rejected() {
        assert!(clean_title("Subscribe to our premium daily briefing").is_none());
        assert!(clean_title("Newsletter: what happened this week").is_none());
        assert!(clean_title("Exam results announced across the state").is_some());
    }

    #[test]
    fn strip_markup_removes_tags_and_entities() {
        let s = "<p>Results &amp; rankings</p>\n<img src=\"x.jpg\"/> are out";
        assert_eq!(strip_markup(s), "Results & rankings are out");
    }

    #[test]
    fn dedup_keeps_first_seen() {
        let raw = vec![
            article("Same story headline", "https://a.example/1"),
            article("Same story headline", "https://a.example/1"),
            article("Same story headline", "https://b.example/1"),
        ];
        let (unique, dropped) = dedup_articles(raw);
        assert_eq!(unique.len(), 2);
        assert_eq!(dropped, 1);
        assert_eq!(unique[0].source, "test");
        assert_eq!(unique[1].link, "https://b.example/1");
    }
}
