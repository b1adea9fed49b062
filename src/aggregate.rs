// src/aggregate.rs
//! Fan-out controller. Issues every provider call concurrently, isolates
//! failures per branch (a failed or timed-out provider yields `null` for
//! that section only), and merges the survivors into one response.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use crate::ai::{summarize_or_fallback, AiDelegate};
use crate::providers::{ContentItem, SearchProvider};

/// Which vertical a single-vertical request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Blog,
    Cafe,
    Youtube,
}

impl ContentType {
    /// Unknown strings fall back to blog, the original default.
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("cafe") => ContentType::Cafe,
            Some("youtube") => ContentType::Youtube,
            _ => ContentType::Blog,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Blog => "blog",
            ContentType::Cafe => "cafe",
            ContentType::Youtube => "youtube",
        }
    }
}

/// One populated section of the aggregated response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSection {
    pub summary: String,
    pub links: Vec<ContentItem>,
}

/// The full fan-out result; `null` sections mark failed branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub blog: Option<SearchSection>,
    pub cafe: Option<SearchSection>,
    pub video: Option<SearchSection>,
    pub news: Option<SearchSection>,
}

pub struct Aggregator {
    blog: Arc<dyn SearchProvider>,
    cafe: Arc<dyn SearchProvider>,
    video: Arc<dyn SearchProvider>,
    news: Arc<dyn SearchProvider>,
    ai: Arc<dyn AiDelegate>,
    branch_timeout: Duration,
    search_page_size: u32,
}

impl Aggregator {
    pub fn new(
        blog: Arc<dyn SearchProvider>,
        cafe: Arc<dyn SearchProvider>,
        video: Arc<dyn SearchProvider>,
        news: Arc<dyn SearchProvider>,
        ai: Arc<dyn AiDelegate>,
        branch_timeout: Duration,
        search_page_size: u32,
    ) -> Self {
        Self {
            blog,
            cafe,
            video,
            news,
            ai,
            branch_timeout,
            search_page_size,
        }
    }

    /// Concurrent fan-out over all four verticals. Branches settle
    /// independently; none is cancelled because another failed.
    pub async fn search_all(&self, keyword: &str) -> SearchResponse {
        counter!("search_requests_total").increment(1);
        let (blog, cafe, video, news) = tokio::join!(
            self.branch(&*self.blog, keyword),
            self.branch(&*self.cafe, keyword),
            self.branch(&*self.video, keyword),
            self.branch(&*self.news, keyword),
        );
        SearchResponse {
            blog,
            cafe,
            video,
            news,
        }
    }

    async fn branch(&self, provider: &dyn SearchProvider, keyword: &str) -> Option<SearchSection> {
        let items = match self.fetch_items(provider, keyword, self.search_page_size).await {
            Ok(v) => v,
            Err(()) => return None,
        };

        let links: Vec<ContentItem> = items.into_iter().map(ContentItem::from_raw).collect();
        let summary_input = summary_input(&links);
        let summary = summarize_or_fallback(&*self.ai, &summary_input, keyword)
            .await
            .into_inner();

        Some(SearchSection { summary, links })
    }

    /// Provider call under the per-branch deadline. Failures are logged and
    /// counted here; the caller only sees "this branch produced nothing".
    async fn fetch_items(
        &self,
        provider: &dyn SearchProvider,
        keyword: &str,
        page_size: u32,
    ) -> Result<Vec<crate::providers::RawItem>, ()> {
        let t0 = Instant::now();
        let result = timeout(self.branch_timeout, provider.search(keyword, page_size)).await;
        // Every outcome contributes a latency sample, timeouts included.
        histogram!("provider_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        match result {
            Err(_) => {
                tracing::warn!(provider = provider.name(), "provider deadline exceeded");
                counter!("provider_timeouts_total", "provider" => provider.name()).increment(1);
                Err(())
            }
            Ok(Err(e)) => {
                tracing::warn!(error = ?e, provider = provider.name(), "provider error");
                counter!("provider_errors_total", "provider" => provider.name()).increment(1);
                Err(())
            }
            Ok(Ok(items)) => Ok(items),
        }
    }

    /// Fetch a single vertical for the analysis pipeline.
    ///
    /// Blog/cafe errors propagate (the request has nothing to analyze);
    /// a failed video scrape degrades to an empty item list, matching the
    /// aggregated endpoint's tolerance for that provider.
    pub async fn analysis_items(
        &self,
        keyword: &str,
        content_type: ContentType,
        page_size: u32,
    ) -> anyhow::Result<Vec<ContentItem>> {
        let items = match content_type {
            ContentType::Blog => self
                .fetch_items(&*self.blog, keyword, page_size)
                .await
                .map_err(|_| anyhow::anyhow!("blog provider failed"))?,
            ContentType::Cafe => self
                .fetch_items(&*self.cafe, keyword, page_size)
                .await
                .map_err(|_| anyhow::anyhow!("cafe provider failed"))?,
            ContentType::Youtube => self
                .fetch_items(&*self.video, keyword, page_size)
                .await
                .unwrap_or_default(),
        };
        Ok(items.into_iter().map(ContentItem::from_raw).collect())
    }
}

/// Numbered title/description blob handed to the summarizer.
fn summary_input(items: &[ContentItem]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!(
            "{}. 제목: {}\n내용: {}\n\n",
            i + 1,
            item.title,
            item.description
        ));
    }
    out
}

/// Concatenated text blob for sentiment scoring.
pub fn analysis_text(items: &[ContentItem]) -> String {
    let mut out = String::new();
    for item in items {
        out.push(' ');
        out.push_str(&item.title);
        out.push(' ');
        out.push_str(&item.description);
    }
    out
}

/// Top-5 content sample included in generation prompts.
pub fn content_sample(items: &[ContentItem]) -> String {
    items
        .iter()
        .take(5)
        .map(|item| format!("제목: {}\n내용: {}", item.title, item.description))
        .collect::<Vec<_>>()
        .join("\n\n")
}
