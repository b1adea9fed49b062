// src/ai/mod.rs
//! AI delegate: the seam between the service and the external language
//! model. Every operation that has a deterministic fallback is wrapped in
//! [`Generated`] at the call site so a fallback is distinguishable from a
//! genuine model answer (logged + counted, same wire shape).

pub mod fallback;
pub mod openai;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::keywords::KeywordFrequency;
use crate::providers::{ContentItem, Sentiment};

/// Hard cap on items sent to a single classification call.
pub const CLASSIFY_BATCH_MAX: usize = 30;

// ------------------------------------------------------------
// Wire types produced by the model
// ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredKeyword {
    pub keyword: String,
    /// 1-10 by prompt contract; not clamped (trust-the-model, see DESIGN.md).
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentSummary {
    #[serde(default)]
    pub positive: f32,
    #[serde(default)]
    pub negative: f32,
    #[serde(default)]
    pub neutral: f32,
    #[serde(default)]
    pub positive_keywords: Vec<ScoredKeyword>,
    #[serde(default)]
    pub negative_keywords: Vec<ScoredKeyword>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSentiment {
    pub index: usize,
    pub sentiment: Sentiment,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdSuggestion {
    pub headline: String,
    pub description: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdEvaluation {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OurAd {
    /// 0 when the company's ad was not found in the screenshot.
    pub rank: i32,
    pub evaluation: AdEvaluation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdImprovement {
    pub title: String,
    pub description: String,
    pub improvement_points: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdAnalysis {
    pub our_ad: OurAd,
    pub competitor_analysis: String,
    pub ad_suggestions: Vec<AdImprovement>,
}

// ------------------------------------------------------------
// Errors and the model-vs-fallback marker
// ------------------------------------------------------------

#[derive(Debug)]
pub enum AiError {
    /// Call-level failure: missing key, network, non-2xx.
    Unavailable(String),
    /// The model answered but the output failed schema validation.
    Malformed(String),
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::Unavailable(m) => write!(f, "ai unavailable: {m}"),
            AiError::Malformed(m) => write!(f, "ai output malformed: {m}"),
        }
    }
}

impl std::error::Error for AiError {}

/// A value that either came from the model or from a deterministic
/// fallback. Callers that only care about the payload use `into_inner`;
/// the distinction stays observable for logs and metrics.
#[derive(Debug, Clone, PartialEq)]
pub enum Generated<T> {
    Model(T),
    Fallback(T),
}

impl<T> Generated<T> {
    pub fn value(&self) -> &T {
        match self {
            Generated::Model(v) | Generated::Fallback(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Generated::Model(v) | Generated::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Generated::Fallback(_))
    }
}

// ------------------------------------------------------------
// The delegate seam
// ------------------------------------------------------------

#[async_trait::async_trait]
pub trait AiDelegate: Send + Sync {
    /// ~500-char Korean summary of provider search results.
    async fn summarize(&self, content: &str, keyword: &str) -> Result<String, AiError>;

    /// Sentiment distribution + top positive/negative keywords for a blob.
    async fn score_sentiment(&self, text: &str) -> Result<SentimentSummary, AiError>;

    /// Per-item sentiment for up to [`CLASSIFY_BATCH_MAX`] items in one call.
    async fn classify_items(&self, items: &[ContentItem]) -> Result<Vec<ItemSentiment>, AiError>;

    /// 10 ad suggestions grounded in content + keyword + sentiment context.
    async fn generate_ad_copy(
        &self,
        keyword: &str,
        content: &str,
        keywords: &[KeywordFrequency],
        sentiment: Option<&SentimentSummary>,
    ) -> Result<Vec<AdSuggestion>, AiError>;

    /// Free-form Q&A over a keyword-metrics table; markdown out. No fallback.
    async fn answer_query(
        &self,
        metrics_json: &serde_json::Value,
        question: &str,
    ) -> Result<String, AiError>;

    /// Vision analysis of a search-results screenshot (base64 JPEG).
    async fn analyze_ad_image(
        &self,
        image_base64: &str,
        keyword: &str,
        company: &str,
    ) -> Result<AdAnalysis, AiError>;
}

// ------------------------------------------------------------
// Fallback-wrapping call helpers
// ------------------------------------------------------------

pub(crate) fn note_fallback(operation: &'static str, err: &AiError) {
    tracing::warn!(%err, operation, "ai call degraded to fallback");
    metrics::counter!("ai_fallback_total", "operation" => operation).increment(1);
}

pub async fn summarize_or_fallback(
    ai: &dyn AiDelegate,
    content: &str,
    keyword: &str,
) -> Generated<String> {
    match ai.summarize(content, keyword).await {
        Ok(s) => Generated::Model(s),
        Err(e) => {
            note_fallback("summarize", &e);
            Generated::Fallback(fallback::summary_unavailable())
        }
    }
}

pub async fn sentiment_or_fallback(ai: &dyn AiDelegate, text: &str) -> Generated<SentimentSummary> {
    match ai.score_sentiment(text).await {
        Ok(s) => Generated::Model(s),
        Err(e) => {
            note_fallback("score_sentiment", &e);
            Generated::Fallback(fallback::neutral_sentiment())
        }
    }
}

pub async fn classify_or_fallback(
    ai: &dyn AiDelegate,
    items: &[ContentItem],
) -> Generated<Vec<ItemSentiment>> {
    let batch = &items[..items.len().min(CLASSIFY_BATCH_MAX)];
    match ai.classify_items(batch).await {
        Ok(v) => Generated::Model(v),
        Err(e) => {
            note_fallback("classify_items", &e);
            Generated::Fallback(fallback::neutral_classifications(batch.len()))
        }
    }
}

pub async fn ad_copy_or_fallback(
    ai: &dyn AiDelegate,
    keyword: &str,
    content: &str,
    keywords: &[KeywordFrequency],
    sentiment: Option<&SentimentSummary>,
) -> Generated<Vec<AdSuggestion>> {
    match ai.generate_ad_copy(keyword, content, keywords, sentiment).await {
        Ok(v) => Generated::Model(v),
        Err(e) => {
            note_fallback("generate_ad_copy", &e);
            Generated::Fallback(fallback::default_ad_suggestions(keyword, keywords))
        }
    }
}

// ------------------------------------------------------------
// Stub delegate for tests and local runs
// ------------------------------------------------------------

/// Deterministic delegate: every operation returns the configured value or
/// `AiError::Unavailable` when unset.
#[derive(Default, Clone)]
pub struct StubDelegate {
    pub summary: Option<String>,
    pub sentiment: Option<SentimentSummary>,
    pub classifications: Option<Vec<ItemSentiment>>,
    pub ad_copy: Option<Vec<AdSuggestion>>,
    pub answer: Option<String>,
    pub ad_analysis: Option<AdAnalysis>,
}

fn stub_value<T: Clone>(v: &Option<T>) -> Result<T, AiError> {
    v.clone()
        .ok_or_else(|| AiError::Unavailable("stub: not configured".to_string()))
}

#[async_trait::async_trait]
impl AiDelegate for StubDelegate {
    async fn summarize(&self, _content: &str, _keyword: &str) -> Result<String, AiError> {
        stub_value(&self.summary)
    }

    async fn score_sentiment(&self, _text: &str) -> Result<SentimentSummary, AiError> {
        stub_value(&self.sentiment)
    }

    async fn classify_items(&self, _items: &[ContentItem]) -> Result<Vec<ItemSentiment>, AiError> {
        stub_value(&self.classifications)
    }

    async fn generate_ad_copy(
        &self,
        _keyword: &str,
        _content: &str,
        _keywords: &[KeywordFrequency],
        _sentiment: Option<&SentimentSummary>,
    ) -> Result<Vec<AdSuggestion>, AiError> {
        stub_value(&self.ad_copy)
    }

    async fn answer_query(
        &self,
        _metrics_json: &serde_json::Value,
        _question: &str,
    ) -> Result<String, AiError> {
        stub_value(&self.answer)
    }

    async fn analyze_ad_image(
        &self,
        _image_base64: &str,
        _keyword: &str,
        _company: &str,
    ) -> Result<AdAnalysis, AiError> {
        stub_value(&self.ad_analysis)
    }
}
