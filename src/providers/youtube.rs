// src/providers/youtube.rs
//! Video search adapter. Two modes, selected by configuration:
//! the authenticated YouTube Data API (structured JSON, ISO dates) or an
//! unauthenticated results-page scrape (no dates).

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

use crate::dates::RawDate;
use crate::providers::{RawItem, SearchProvider};

const DATA_API_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const RESULTS_URL: &str = "https://www.youtube.com/results";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

enum Mode {
    /// YouTube Data API v3 with an API key.
    Api { api_key: String },
    /// Scrape the public results page.
    Scrape,
}

pub struct YoutubeProvider {
    http: reqwest::Client,
    mode: Mode,
}

impl YoutubeProvider {
    /// Pick the Data API when a key is configured, the scrape otherwise.
    pub fn new(api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("keyword-scout/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        let mode = match api_key.filter(|k| !k.is_empty()) {
            Some(api_key) => Mode::Api { api_key },
            None => Mode::Scrape,
        };
        Self { http, mode }
    }

    /// Extract video entries from a results-page HTML dump.
    ///
    /// The page inlines a JSON blob per video; the first pattern captures
    /// id + title + description snippet, the second id + title only (used
    /// to top up entries whose snippet is absent). De-duplicated by URL,
    /// capped at `limit`.
    pub fn parse_results_page(html: &str, limit: usize) -> Vec<RawItem> {
        static RE_FULL: OnceCell<Regex> = OnceCell::new();
        let re_full = RE_FULL.get_or_init(|| {
            Regex::new(
                r#""videoRenderer":\{"videoId":"([^"]+)","thumbnail.+?"title":\{"runs":\[\{"text":"([^"]+)"\}\].+?"descriptionSnippet":\{"runs":\[\{"text":"([^"]+)""#,
            )
            .unwrap()
        });
        static RE_SIMPLE: OnceCell<Regex> = OnceCell::new();
        let re_simple = RE_SIMPLE.get_or_init(|| {
            Regex::new(
                r#""videoRenderer":\{"videoId":"([^"]+)","thumbnail.+?"title":\{"runs":\[\{"text":"([^"]+)"\}\]"#,
            )
            .unwrap()
        });

        let mut out: Vec<RawItem> = Vec::new();

        for cap in re_full.captures_iter(html) {
            out.push(RawItem {
                title: cap[2].to_string(),
                link: format!("{WATCH_URL}{}", &cap[1]),
                description: cap[3].to_string(),
                date: None,
            });
            if out.len() >= limit {
                return out;
            }
        }

        for cap in re_simple.captures_iter(html) {
            let link = format!("{WATCH_URL}{}", &cap[1]);
            if out.iter().any(|v| v.link == link) {
                continue;
            }
            out.push(RawItem {
                title: cap[2].to_string(),
                link,
                description: String::new(),
                date: None,
            });
            if out.len() >= limit {
                break;
            }
        }

        out
    }
}

#[derive(Debug, Deserialize)]
struct ApiBody {
    #[serde(default)]
    items: Vec<ApiItem>,
}

#[derive(Debug, Deserialize)]
struct ApiItem {
    id: ApiId,
    snippet: ApiSnippet,
}

#[derive(Debug, Deserialize)]
struct ApiId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[async_trait]
impl SearchProvider for YoutubeProvider {
    async fn search(&self, keyword: &str, page_size: u32) -> Result<Vec<RawItem>> {
        match &self.mode {
            Mode::Api { api_key } => {
                let resp = self
                    .http
                    .get(DATA_API_URL)
                    .query(&[
                        ("part", "snippet"),
                        ("type", "video"),
                        ("q", keyword),
                        ("maxResults", &page_size.to_string()),
                        ("key", api_key),
                    ])
                    .send()
                    .await
                    .context("youtube data api get")?
                    .error_for_status()
                    .context("youtube data api status")?;
                let body: ApiBody = resp.json().await.context("youtube data api json")?;

                let out = body
                    .items
                    .into_iter()
                    .filter_map(|it| {
                        let id = it.id.video_id?;
                        Some(RawItem {
                            title: it.snippet.title,
                            link: format!("{WATCH_URL}{id}"),
                            description: it.snippet.description,
                            date: it.snippet.published_at.map(RawDate::Iso),
                        })
                    })
                    .collect();
                Ok(out)
            }
            Mode::Scrape => {
                let resp = self
                    .http
                    .get(RESULTS_URL)
                    .query(&[("search_query", keyword)])
                    .send()
                    .await
                    .context("youtube results get")?
                    .error_for_status()
                    .context("youtube results status")?;
                let html = resp.text().await.context("youtube results body")?;
                Ok(Self::parse_results_page(&html, page_size as usize))
            }
        }
    }

    fn name(&self) -> &'static str {
        "youtube"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(id: &str, title: &str, desc: Option<&str>) -> String {
        let mut s = format!(
            r#""videoRenderer":{{"videoId":"{id}","thumbnail":{{}},"title":{{"runs":[{{"text":"{title}"}}]"#
        );
        if let Some(d) = desc {
            s.push_str(&format!(
                r#","descriptionSnippet":{{"runs":[{{"text":"{d}""#
            ));
        }
        s
    }

    #[test]
    fn parses_videos_with_and_without_snippets() {
        let html = format!(
            "{} {}",
            renderer("abc123", "커피 추출 가이드", Some("핸드드립 기초")),
            renderer("def456", "라떼아트", None),
        );
        let items = YoutubeProvider::parse_results_page(&html, 10);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].link, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(items[0].description, "핸드드립 기초");
        assert_eq!(items[1].description, "");
        assert!(items.iter().all(|i| i.date.is_none()));
    }

    #[test]
    fn dedups_by_url_and_caps_at_limit() {
        let html = format!(
            "{} {} {}",
            renderer("aaa", "하나", Some("설명")),
            renderer("aaa", "하나", None),
            renderer("bbb", "둘", None),
        );
        let items = YoutubeProvider::parse_results_page(&html, 1);
        assert_eq!(items.len(), 1);

        let items = YoutubeProvider::parse_results_page(&html, 10);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn empty_page_yields_no_items() {
        assert!(YoutubeProvider::parse_results_page("<html></html>", 10).is_empty());
    }
}
