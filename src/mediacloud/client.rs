// src/mediacloud/client.rs
//! Reqwest-backed [`SearchApi`] implementation.
//!
//! Every request carries the API key as a query parameter and runs under the
//! per-call timeout baked into the inner client. The only retried failure is
//! HTTP 429: bounded exponential backoff with jitter, then
//! [`ApiError::RateLimited`] once attempts are exhausted. Every other non-2xx
//! status surfaces immediately as [`ApiError::Api`].

use std::time::Duration;

use async_trait::async_trait;
use rand::{rng, Rng};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::error::{ApiError, Result};
use super::types::{CountResult, Story, TagCount, WordCount};
use super::SearchApi;

/// Public v2 endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://api.mediacloud.org/api/v2";

/// Total tries per request, the first one included.
const MAX_ATTEMPTS: usize = 4;
const BASE_DELAY: Duration = Duration::from_secs(1);
const MAX_DELAY: Duration = Duration::from_secs(30);

pub struct MediaCloudClient {
    http: reqwest::Client,
    base_url: String,
    key: String,
    backoff_base: Duration,
    backoff_cap: Duration,
}

impl MediaCloudClient {
    pub fn new(key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(key, DEFAULT_BASE_URL, timeout)
    }

    /// Point the client somewhere else, e.g. a local stub while debugging.
    pub fn with_base_url(
        key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                "media-coverage-explorer/",
                env!("CARGO_PKG_VERSION")
            ))
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            key: key.into(),
            backoff_base: BASE_DELAY,
            backoff_cap: MAX_DELAY,
        })
    }

    /// Override the retry backoff bounds. Tests shrink these to keep the
    /// rate-limit paths fast; production keeps the defaults.
    pub fn with_backoff(mut self, base: Duration, cap: Duration) -> Self {
        self.backoff_base = base;
        self.backoff_cap = cap;
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        let mut attempt = 1usize;

        loop {
            let resp = self
                .http
                .get(&url)
                .query(params)
                .query(&[("key", self.key.as_str())])
                .send()
                .await?;

            let status = resp.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let message = resp.text().await.unwrap_or_default();
                if attempt >= MAX_ATTEMPTS {
                    return Err(ApiError::RateLimited { message });
                }
                let delay = self.backoff_delay(attempt);
                warn!(path, attempt, max = MAX_ATTEMPTS, ?delay, "rate limited, backing off");
                sleep(delay).await;
                attempt += 1;
                continue;
            }
            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(ApiError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            debug!(path, attempt, "request ok");
            let body = resp.text().await?;
            return serde_json::from_str(&body).map_err(ApiError::from);
        }
    }

    /// `delay = min(base * 2^(attempt-1), cap) + jitter(0..=250ms)`
    fn backoff_delay(&self, attempt: usize) -> Duration {
        let mut delay = self.backoff_base.saturating_mul(1 << (attempt - 1));
        if delay > self.backoff_cap {
            delay = self.backoff_cap;
        }
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + Duration::from_millis(jitter_ms)
    }
}

/// `wc/list` wraps its terms when sampling stats are requested.
#[derive(Deserialize)]
struct WordListResponse {
    words: Vec<WordCount>,
}

#[async_trait]
impl SearchApi for MediaCloudClient {
    async fn story_count(&self, q: &str, fq: &str) -> Result<CountResult> {
        let params = [("q", q.to_string()), ("fq", fq.to_string())];
        self.get_json("stories_public/count", &params).await
    }

    async fn story_page(
        &self,
        q: &str,
        fq: &str,
        last_processed_stories_id: u64,
        rows: u32,
    ) -> Result<Vec<Story>> {
        let params = [
            ("q", q.to_string()),
            ("fq", fq.to_string()),
            (
                "last_processed_stories_id",
                last_processed_stories_id.to_string(),
            ),
            ("rows", rows.to_string()),
            ("sort", "processed_stories_id".to_string()),
        ];
        self.get_json("stories_public/list", &params).await
    }

    async fn word_count(&self, q: &str, fq: &str, sample_size: u32) -> Result<Vec<WordCount>> {
        let params = [
            ("q", q.to_string()),
            ("fq", fq.to_string()),
            ("sample_size", sample_size.to_string()),
            ("include_stats", "1".to_string()),
        ];
        let resp: WordListResponse = self.get_json("wc/list", &params).await?;
        Ok(resp.words)
    }

    async fn tag_count(&self, q: &str, fq: &str, tag_sets_id: u64) -> Result<Vec<TagCount>> {
        let params = [
            ("q", q.to_string()),
            ("fq", fq.to_string()),
            ("tag_sets_id", tag_sets_id.to_string()),
        ];
        self.get_json("stories_public/tag_count", &params).await
    }
}
