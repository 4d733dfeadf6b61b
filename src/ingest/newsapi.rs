// src/ingest/newsapi.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use crate::ingest::image::is_valid_image_url;
use crate::ingest::types::{Article, ArticleSource};
use crate::ingest::{clean_title, strip_markup};

pub const DEFAULT_NEWS_API_ENDPOINT: &str = "https://newsapi.org/v2/everything";
pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    content: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
    source: Option<ApiSourceName>,
}

#[derive(Debug, Deserialize)]
struct ApiSourceName {
    name: Option<String>,
}

/// News-search API client: one GET per run, keyed by topic.
pub struct NewsApiSource {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    topic: String,
    language: String,
    page_size: u32,
}

impl NewsApiSource {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        api_key: &str,
        topic: &str,
        language: &str,
        page_size: u32,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            topic: topic.to_string(),
            language: language.to_string(),
            page_size,
        }
    }

    fn map_articles(&self, resp: ApiResponse) -> Vec<Article> {
        let mut out = Vec::with_capacity(resp.articles.len());
        for item in resp.articles {
            let Some(title) = item.title.as_deref().and_then(clean_title) else {
                continue;
            };

            let image_url = item
                .url_to_image
                .as_deref()
                .filter(|u| is_valid_image_url(u))
                .map(str::to_string);

            let source_name = item
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "Unknown".to_string());

            out.push(Article {
                title,
                link: item.url.clone().unwrap_or_default(),
                summary: strip_markup(item.description.as_deref().unwrap_or_default()),
                raw_content: item.content.unwrap_or_default(),
                image_url,
                source: format!("News API - {source_name}"),
                classification: None,
            });
        }
        counter!("fetch_entries_total").increment(out.len() as u64);
        out
    }
}

#[async_trait]
impl ArticleSource for NewsApiSource {
    async fn fetch(&self) -> Result<Vec<Article>> {
        let page_size = self.page_size.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", self.topic.as_str()),
                ("language", self.language.as_str()),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("news api get")?;

        if !resp.status().is_success() {
            anyhow::bail!("news api returned status {}", resp.status());
        }

        let body: ApiResponse = resp.json().await.context("news api json")?;
        Ok(self.map_articles(body))
    }

    fn name(&self) -> String {
        "News API".to_string()
    }
}
