// src/providers/naver.rs
//! Naver open-API search adapter. One adapter covers the blog, cafe-article
//! and news verticals; they share the endpoint family and credential
//! headers and differ only in path and date shape.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::dates::RawDate;
use crate::providers::{RawItem, SearchProvider};

const OPENAPI_BASE: &str = "https://openapi.naver.com/v1/search";

/// Which search vertical to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Blog,
    Cafe,
    News,
}

impl Vertical {
    fn path(self) -> &'static str {
        match self {
            Vertical::Blog => "blog.json",
            Vertical::Cafe => "cafearticle.json",
            Vertical::News => "news.json",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Vertical::Blog => "naver-blog",
            Vertical::Cafe => "naver-cafe",
            Vertical::News => "naver-news",
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
    /// Blog/cafe: 8-digit YYYYMMDD.
    postdate: Option<String>,
    /// News: RFC-2822.
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

pub struct NaverSearchProvider {
    http: reqwest::Client,
    vertical: Vertical,
    client_id: String,
    client_secret: String,
}

impl NaverSearchProvider {
    pub fn new(vertical: Vertical, client_id: String, client_secret: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("keyword-scout/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            vertical,
            client_id,
            client_secret,
        }
    }

    fn tag_date(vertical: Vertical, item: &Item) -> Option<RawDate> {
        match vertical {
            Vertical::Blog | Vertical::Cafe => {
                item.postdate.clone().map(RawDate::Compact)
            }
            Vertical::News => item.pub_date.clone().map(RawDate::Rfc2822),
        }
    }

    /// Map a provider-native response body into tagged raw items.
    pub fn parse_response(vertical: Vertical, body: &str) -> Result<Vec<RawItem>> {
        let parsed: SearchBody =
            serde_json::from_str(body).context("parsing naver search json")?;
        let out = parsed
            .items
            .into_iter()
            .map(|it| {
                let date = Self::tag_date(vertical, &it);
                RawItem {
                    title: it.title,
                    link: it.link,
                    description: it.description,
                    date,
                }
            })
            .collect();
        Ok(out)
    }
}

#[async_trait]
impl SearchProvider for NaverSearchProvider {
    async fn search(&self, keyword: &str, page_size: u32) -> Result<Vec<RawItem>> {
        anyhow::ensure!(
            !self.client_id.is_empty() && !self.client_secret.is_empty(),
            "naver open-api credentials missing"
        );

        let url = format!("{OPENAPI_BASE}/{}", self.vertical.path());
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("query", keyword),
                ("display", &page_size.to_string()),
                ("start", "1"),
                ("sort", "sim"),
            ])
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .send()
            .await
            .with_context(|| format!("{} http get", self.vertical.name()))?
            .error_for_status()
            .with_context(|| format!("{} http status", self.vertical.name()))?;

        let body = resp.text().await.context("naver response body")?;
        Self::parse_response(self.vertical, &body)
    }

    fn name(&self) -> &'static str {
        self.vertical.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOG_BODY: &str = r#"{
        "items": [
            {"title": "<b>커피</b> 원두", "link": "https://blog.naver.com/a",
             "description": "산미 <b>비교</b>", "postdate": "20250810"},
            {"title": "홈카페", "link": "https://blog.naver.com/b",
             "description": "장비"}
        ]
    }"#;

    #[test]
    fn blog_items_carry_compact_dates() {
        let items = NaverSearchProvider::parse_response(Vertical::Blog, BLOG_BODY).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].date, Some(RawDate::Compact("20250810".into())));
        assert_eq!(items[1].date, None);
    }

    #[test]
    fn news_items_carry_rfc2822_dates() {
        let body = r#"{"items": [{"title": "t", "link": "u", "description": "d",
            "pubDate": "Tue, 26 Aug 2025 10:30:00 +0900"}]}"#;
        let items = NaverSearchProvider::parse_response(Vertical::News, body).unwrap();
        assert_eq!(
            items[0].date,
            Some(RawDate::Rfc2822("Tue, 26 Aug 2025 10:30:00 +0900".into()))
        );
    }

    #[test]
    fn missing_items_field_is_empty_not_error() {
        let items = NaverSearchProvider::parse_response(Vertical::Blog, "{}").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(NaverSearchProvider::parse_response(Vertical::Blog, "not json").is_err());
    }
}
