// tests/fetch_dedup.rs
use news_digest::feeds::FeedSource;
use news_digest::ingest::fetch_articles;
use news_digest::ingest::rss::RssFeedSource;
use news_digest::ingest::types::{Article, ArticleSource};

const FEED_ONE: &str = include_str!("fixtures/edu_feed_one.xml");
const FEED_TWO: &str = include_str!("fixtures/edu_feed_two.xml");

fn feed(name: &str, url: &str) -> FeedSource {
    FeedSource {
        name: name.to_string(),
        url: url.to_string(),
        topic: "education".to_string(),
        region: "india".to_string(),
    }
}

struct BrokenSource;

#[async_trait::async_trait]
impl ArticleSource for BrokenSource {
    async fn fetch(&self) -> anyhow::Result<Vec<Article>> {
        anyhow::bail!("connection refused")
    }
    fn name(&self) -> String {
        "Broken".to_string()
    }
}

#[tokio::test]
async fn duplicate_across_feeds_is_kept_once_first_seen() {
    let sources: Vec<Box<dyn ArticleSource>> = vec![
        Box::new(RssFeedSource::from_fixture(
            feed("One", "https://one.example.in/rss.xml"),
            FEED_ONE,
        )),
        Box::new(RssFeedSource::from_fixture(
            feed("Two", "https://two.example.in/rss.xml"),
            FEED_TWO,
        )),
    ];

    let articles = fetch_articles(&sources, None).await;

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "State board announces revised exam schedule");
    // First-seen wins: the copy from feed one, with its thumbnail.
    assert_eq!(articles[0].source, "RSS Feed - one.example.in");
    assert_eq!(
        articles[0].image_url.as_deref(),
        Some("https://cdn.example.in/thumbs/schedule.jpg")
    );
}

#[tokio::test]
async fn failing_feed_is_skipped_not_fatal() {
    let sources: Vec<Box<dyn ArticleSource>> = vec![
        Box::new(BrokenSource),
        Box::new(RssFeedSource::from_fixture(
            feed("One", "https://one.example.in/rss.xml"),
            FEED_ONE,
        )),
    ];

    let articles = fetch_articles(&sources, None).await;
    assert_eq!(articles.len(), 1, "healthy feed still contributes");
}

#[tokio::test]
async fn broken_api_source_yields_zero_api_articles() {
    let sources: Vec<Box<dyn ArticleSource>> = vec![Box::new(RssFeedSource::from_fixture(
        feed("One", "https://one.example.in/rss.xml"),
        FEED_ONE,
    ))];

    let articles = fetch_articles(&sources, Some(&BrokenSource)).await;
    assert_eq!(articles.len(), 1, "rss collection survives api failure");
}
