// src/classify/client.rs
//! LLM completion clients: provider abstraction, the hosted Gemini provider,
//! a deterministic mock, and a bounded-retry wrapper.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// A completion client: free-text prompt in, free-text response out.
/// `None` means the call failed (transport, non-2xx, empty completion).
pub trait LlmClient: Send + Sync {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;

    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

/// Gemini `generateContent` provider. Requires `GEMINI_API_KEY`.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(model: &str) -> Self {
        let api_key = std::env::var(ENV_GEMINI_API_KEY).unwrap_or_default();
        let http = reqwest::Client::builder()
            .user_agent("news-digest/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            api_key,
            model: model.to_string(),
        }
    }
}

impl LlmClient for GeminiClient {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Part<'a> {
                text: &'a str,
            }
            #[derive(Serialize)]
            struct Content<'a> {
                parts: Vec<Part<'a>>,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                contents: Vec<Content<'a>>,
            }
            #[derive(Deserialize)]
            struct Resp {
                #[serde(default)]
                candidates: Vec<Candidate>,
            }
            #[derive(Deserialize)]
            struct Candidate {
                content: CandidateContent,
            }
            #[derive(Deserialize)]
            struct CandidateContent {
                #[serde(default)]
                parts: Vec<CandidatePart>,
            }
            #[derive(Deserialize)]
            struct CandidatePart {
                #[serde(default)]
                text: String,
            }

            let req = Req {
                contents: vec![Content {
                    parts: vec![Part { text: prompt }],
                }],
            };
            let url = format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                self.model
            );

            let resp = self
                .http
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&req)
                .send()
                .await
                .ok()?;

            if !resp.status().is_success() {
                tracing::warn!(target: "classify", status = %resp.status(), "llm call failed");
                return None;
            }

            let body: Resp = resp.json().await.ok()?;
            let text = body
                .candidates
                .first()
                .and_then(|c| c.content.parts.first())
                .map(|p| p.text.trim().to_string())
                .unwrap_or_default();

            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        })
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

/// Fixed-response client for tests and local runs.
#[derive(Clone)]
pub struct MockLlm {
    pub fixed: String,
}

impl MockLlm {
    pub fn new(fixed: &str) -> Self {
        Self {
            fixed: fixed.to_string(),
        }
    }
}

impl LlmClient for MockLlm {
    fn complete<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Some(out) })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Bounded iterative retry around an inner client: up to `max_attempts`
/// calls with a fixed injectable delay between them (zero in tests). After
/// exhaustion the wrapper yields `None`; callers treat that as a failed
/// batch.
pub struct RetryingClient<C> {
    inner: C,
    max_attempts: u32,
    delay: Duration,
}

impl<C: LlmClient> RetryingClient<C> {
    pub fn new(inner: C, max_attempts: u32, delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    async fn complete_impl(&self, prompt: &str) -> Option<String> {
        for attempt in 1..=self.max_attempts {
            if let Some(text) = self.inner.complete(prompt).await {
                return Some(text);
            }
            if attempt < self.max_attempts {
                tracing::warn!(
                    target: "classify",
                    attempt,
                    provider = self.inner.provider_name(),
                    "llm attempt failed, retrying"
                );
                tokio::time::sleep(self.delay).await;
            }
        }
        None
    }
}

impl<C: LlmClient> LlmClient for RetryingClient<C> {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(self.complete_impl(prompt))
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
