// src/keywords.rs
//! Hangul keyword-frequency extraction.
//!
//! The extractor keeps only Hangul syllables (U+AC00..=U+D7A3); Latin,
//! digits and punctuation are dropped wholesale, so it is only meaningful
//! for Korean text. Tokens shorter than 2 chars, stopwords, and purely
//! numeric tokens are discarded before counting.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::providers::ContentItem;

/// How many keywords a request reports at most.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFrequency {
    pub keyword: String,
    pub frequency: u32,
}

/// Korean particle/filler stopwords. Matches are exact-token.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "있다", "하다", "되다", "이다", "것", "등", "및", "수", "그", "또",
        "또는", "이", "그리고", "이런", "그런", "저런", "어떤", "무슨", "어느",
        "한", "저", "그래서", "하지만", "그런데", "그럼에도", "때문에", "위해",
        "따라서", "인해", "으로", "통해", "이에", "더", "덜", "매우", "정말",
        "너무", "아주", "조금", "거의", "약간", "대략", "어쩌면", "아마", "을",
        "를", "에", "의", "로", "와", "과", "이나", "나", "도", "만", "까지",
        "부터", "에서", "에게", "으로써", "보다", "처럼", "같이", "대해",
        "관해", "께서", "이라고", "라고", "고", "면서",
    ]
    .into_iter()
    .collect()
});

fn is_hangul_syllable(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

/// Split a text blob into meaningful Hangul tokens.
fn meaningful_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !is_hangul_syllable(c))
        .filter(|t| t.chars().count() >= 2)
        .filter(|t| !STOPWORDS.contains(t))
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
}

/// Top-N keyword frequencies across every item's title and description.
///
/// Sorted non-increasing by frequency; the relative order of keywords with
/// equal frequency is unspecified.
pub fn extract(items: &[ContentItem]) -> Vec<KeywordFrequency> {
    let mut blob = String::new();
    for item in items {
        blob.push(' ');
        blob.push_str(&item.title);
        blob.push(' ');
        blob.push_str(&item.description);
    }

    let mut counts: HashMap<&str, u32> = HashMap::new();
    for tok in meaningful_tokens(&blob) {
        *counts.entry(tok).or_insert(0) += 1;
    }

    let mut out: Vec<KeywordFrequency> = counts
        .into_iter()
        .map(|(keyword, frequency)| KeywordFrequency {
            keyword: keyword.to_string(),
            frequency,
        })
        .collect();
    out.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    out.truncate(TOP_N);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, description: &str) -> ContentItem {
        ContentItem {
            title: title.to_string(),
            url: "https://example.com".to_string(),
            description: description.to_string(),
            published_at: None,
            sentiment: None,
            sentiment_score: None,
        }
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(extract(&[]).is_empty());
        assert!(extract(&[item("", "")]).is_empty());
    }

    #[test]
    fn all_stopword_text_yields_empty_list() {
        let items = [item("그리고 하지만", "때문에 그래서")];
        assert!(extract(&items).is_empty());
    }

    #[test]
    fn non_hangul_content_is_dropped_wholesale() {
        let items = [item("coffee 1234 !!", "latte & espresso")];
        assert!(extract(&items).is_empty());
    }

    #[test]
    fn counts_and_sorts_by_frequency() {
        let items = [
            item("원두 원두 원두", "추천 추천"),
            item("원두", "그라인더"),
        ];
        let out = extract(&items);
        assert_eq!(out[0].keyword, "원두");
        assert_eq!(out[0].frequency, 4);
        for w in out.windows(2) {
            assert!(w[0].frequency >= w[1].frequency);
        }
    }

    #[test]
    fn never_returns_short_tokens() {
        let items = [item("물 물 물 커피", "물")];
        let out = extract(&items);
        assert!(out.iter().all(|k| k.keyword.chars().count() >= 2));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].keyword, "커피");
    }

    #[test]
    fn truncates_to_top_ten() {
        let words = [
            "가나다", "나다라", "다라마", "라마바", "마바사", "바사아",
            "사아자", "아자차", "자차카", "차카타", "카타파", "타파하",
        ];
        let blob = words.join(" ");
        let out = extract(&[item(&blob, &blob)]);
        assert_eq!(out.len(), TOP_N);
    }
}
