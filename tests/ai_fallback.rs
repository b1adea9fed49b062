// tests/ai_fallback.rs
// Fallback wrapping: a failed delegate call must yield the deterministic
// template payload, marked as Fallback rather than Model.

use keyword_scout::ai::{
    ad_copy_or_fallback, classify_or_fallback, sentiment_or_fallback, summarize_or_fallback,
    SentimentSummary, StubDelegate, CLASSIFY_BATCH_MAX,
};
use keyword_scout::providers::{ContentItem, Sentiment};

fn item(n: usize) -> ContentItem {
    ContentItem {
        title: format!("글 {n}"),
        url: format!("https://example.com/{n}"),
        description: "본문".to_string(),
        published_at: None,
        sentiment: None,
        sentiment_score: None,
    }
}

#[tokio::test]
async fn unavailable_delegate_degrades_to_neutral_sentiment() {
    let ai = StubDelegate::default();
    let out = sentiment_or_fallback(&ai, "텍스트").await;
    assert!(out.is_fallback());
    let s = out.into_inner();
    assert_eq!((s.positive, s.negative, s.neutral), (0.0, 0.0, 100.0));
}

#[tokio::test]
async fn model_sentiment_is_not_marked_fallback() {
    let ai = StubDelegate {
        sentiment: Some(SentimentSummary {
            positive: 70.0,
            negative: 5.0,
            neutral: 25.0,
            positive_keywords: vec![],
            negative_keywords: vec![],
        }),
        ..StubDelegate::default()
    };
    let out = sentiment_or_fallback(&ai, "텍스트").await;
    assert!(!out.is_fallback());
    assert_eq!(out.value().positive, 70.0);
}

#[tokio::test]
async fn classification_fallback_is_neutral_and_capped() {
    let items: Vec<ContentItem> = (0..CLASSIFY_BATCH_MAX + 5).map(item).collect();
    let out = classify_or_fallback(&StubDelegate::default(), &items).await;
    assert!(out.is_fallback());
    let labels = out.into_inner();
    assert_eq!(labels.len(), CLASSIFY_BATCH_MAX);
    assert!(labels.iter().all(|l| l.sentiment == Sentiment::Neutral));
}

#[tokio::test]
async fn ad_copy_fallback_is_the_ten_entry_template_set() {
    let out = ad_copy_or_fallback(&StubDelegate::default(), "커피", "", &[], None).await;
    assert!(out.is_fallback());
    let ads = out.into_inner();
    assert_eq!(ads.len(), 10);
    assert!(ads.iter().all(|a| !a.headline.is_empty() && !a.target.is_empty()));
    assert!(ads[0].headline.contains("커피"));
}

#[tokio::test]
async fn summary_fallback_is_the_unavailable_notice() {
    let out = summarize_or_fallback(&StubDelegate::default(), "내용", "커피").await;
    assert!(out.is_fallback());
    assert!(out.value().contains("오류"));
}
