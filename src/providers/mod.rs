// src/providers/mod.rs
pub mod naver;
pub mod youtube;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::dates::{coalesce, RawDate};
use crate::normalize::strip_tags;

/// One provider-native search hit, tagged with its date shape at the
/// adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub date: Option<RawDate>,
}

/// Sentiment label assigned by the AI delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// One normalized search result, as returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub title: String,
    pub url: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f32>,
}

impl ContentItem {
    /// Strip markup from the raw item and coalesce its tagged date.
    /// Sentiment fields stay empty until the AI delegate classifies items.
    pub fn from_raw(raw: RawItem) -> Self {
        Self {
            title: strip_tags(&raw.title),
            url: raw.link,
            description: strip_tags(&raw.description),
            published_at: raw.date.as_ref().and_then(coalesce),
            sentiment: None,
            sentiment_score: None,
        }
    }
}

/// An external search source. Failure policy belongs to the aggregator,
/// not the adapter: any error here simply propagates.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, keyword: &str, page_size: u32) -> Result<Vec<RawItem>>;
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_strips_tags_and_coalesces_date() {
        let raw = RawItem {
            title: "<b>커피</b> 추천".into(),
            link: "https://blog.naver.com/x".into(),
            description: "원두 <b>비교</b>".into(),
            date: Some(RawDate::Compact("20250810".into())),
        };
        let item = ContentItem::from_raw(raw);
        assert_eq!(item.title, "커피 추천");
        assert_eq!(item.description, "원두 비교");
        assert_eq!(item.published_at.as_deref(), Some("2025-08-10"));
        assert!(item.sentiment.is_none());
    }

    #[test]
    fn from_raw_without_date_omits_published_at() {
        let raw = RawItem {
            title: "t".into(),
            link: "u".into(),
            description: "d".into(),
            date: None,
        };
        let item = ContentItem::from_raw(raw);
        assert!(item.published_at.is_none());
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("publishedAt").is_none());
    }
}
