// src/ingest/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use url::Url;

use crate::feeds::FeedSource;
use crate::ingest::image;
use crate::ingest::types::{Article, ArticleSource};
use crate::ingest::{clean_title, strip_markup};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "content:encoded")]
    content_encoded: Option<String>,
    #[serde(rename = "thumbnail", default)]
    media_thumbnail: Vec<MediaRef>,
    #[serde(rename = "media:content", default)]
    media_content: Vec<MediaRef>,
    #[serde(rename = "enclosure", default)]
    enclosure: Vec<Enclosure>,
    #[serde(rename = "atom:link", default)]
    atom_link: Vec<AtomLink>,
    #[serde(rename = "category", default)]
    category: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct MediaRef {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@type")]
    media_type: Option<String>,
}

impl MediaRef {
    fn location(&self) -> Option<&str> {
        self.url.as_deref().or(self.href.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct Enclosure {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "@type")]
    enclosure_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@rel")]
    rel: Option<String>,
    #[serde(rename = "@type")]
    link_type: Option<String>,
    #[serde(rename = "@href")]
    href: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Category {
    #[serde(rename = "@domain")]
    domain: Option<String>,
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "$text")]
    term: Option<String>,
}

/// One RSS feed as an article source.
pub struct RssFeedSource {
    feed: FeedSource,
    mode: Mode,
}

enum Mode {
    /// Parse a pre-fetched XML body (tests, replays).
    Fixture(String),
    Http { client: reqwest::Client },
}

impl RssFeedSource {
    pub fn from_url(feed: FeedSource, client: reqwest::Client) -> Self {
        Self {
            feed,
            mode: Mode::Http { client },
        }
    }

    pub fn from_fixture(feed: FeedSource, xml: &str) -> Self {
        Self {
            feed,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    fn parse_items_from_str(&self, body: &str) -> Result<Vec<Article>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(body);
        let rss: Rss = from_str(&xml_clean)
            .with_context(|| format!("parsing rss xml from {}", self.feed.name))?;

        let feed_url = Url::parse(&self.feed.url).ok();
        // Relative image references resolve against the feed origin.
        let origin = feed_url.as_ref().and_then(|u| u.join("/").ok());
        let host = feed_url
            .as_ref()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.feed.name.clone());
        let source_label = format!("RSS Feed - {host}");

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let Some(title) = it.title.as_deref().and_then(clean_title) else {
                continue;
            };

            let image_url = extract_image(&it, origin.as_ref());
            let raw_content = it
                .content_encoded
                .clone()
                .or_else(|| it.description.clone())
                .unwrap_or_default();

            out.push(Article {
                title,
                link: it.link.clone().unwrap_or_default(),
                summary: strip_markup(it.description.as_deref().unwrap_or_default()),
                raw_content,
                image_url,
                source: source_label.clone(),
                classification: None,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("fetch_parse_ms").record(ms);
        counter!("fetch_entries_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl ArticleSource for RssFeedSource {
    async fn fetch(&self) -> Result<Vec<Article>> {
        match &self.mode {
            Mode::Fixture(xml) => self.parse_items_from_str(xml),
            Mode::Http { client } => {
                let resp = client
                    .get(&self.feed.url)
                    .send()
                    .await
                    .with_context(|| format!("feed http get {}", self.feed.url))?;
                if !resp.status().is_success() {
                    anyhow::bail!("feed {} returned status {}", self.feed.url, resp.status());
                }
                let body = resp.text().await.context("feed http .text()")?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> String {
        self.feed.name.clone()
    }
}

/// Ordered fallback chain; first valid match wins.
fn extract_image(item: &Item, origin: Option<&Url>) -> Option<String> {
    // 1) Dedicated media thumbnails.
    if let Some(url) = image::first_valid(
        item.media_thumbnail.iter().filter_map(MediaRef::location),
        origin,
    ) {
        return Some(url);
    }

    // 2) media:content entries tagged as images.
    if let Some(url) = image::first_valid(
        item.media_content
            .iter()
            .filter(|m| type_is_image(m.media_type.as_deref()))
            .filter_map(MediaRef::location),
        origin,
    ) {
        return Some(url);
    }

    // 3) Enclosures tagged as images.
    if let Some(url) = image::first_valid(
        item.enclosure
            .iter()
            .filter(|e| type_is_image(e.enclosure_type.as_deref()))
            .filter_map(|e| e.url.as_deref()),
        origin,
    ) {
        return Some(url);
    }

    // 4) Markup scan over the body fields.
    for body in [item.description.as_deref(), item.content_encoded.as_deref()]
        .into_iter()
        .flatten()
    {
        let candidates = image::scan_html_for_images(body);
        if let Some(url) = image::first_valid(candidates.iter().map(String::as_str), origin) {
            return Some(url);
        }
    }

    // 5) Atom links with rel=enclosure and an image type.
    if let Some(url) = image::first_valid(
        item.atom_link
            .iter()
            .filter(|l| {
                l.rel.as_deref() == Some("enclosure") && type_is_image(l.link_type.as_deref())
            })
            .filter_map(|l| l.href.as_deref()),
        origin,
    ) {
        return Some(url);
    }

    // 6) Category entries mentioning "image".
    image::first_valid(
        item.category
            .iter()
            .filter(|c| {
                c.term
                    .as_deref()
                    .map(|t| t.to_lowercase().contains("image"))
                    .unwrap_or(false)
            })
            .filter_map(|c| c.url.as_deref().or(c.domain.as_deref())),
        origin,
    )
}

fn type_is_image(mime: Option<&str>) -> bool {
    mime.map(|t| t.to_lowercase().contains("image"))
        .unwrap_or(false)
}

/// RSS descriptions routinely carry HTML entities that are not valid XML.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
