// tests/metrics.rs
// Prometheus exposition: described series keep their HELP text, and failed
// provider fetches still contribute latency samples.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use http::Request;
use tower::ServiceExt;

use keyword_scout::aggregate::Aggregator;
use keyword_scout::ai::{AiDelegate, StubDelegate};
use keyword_scout::metrics::Metrics;
use keyword_scout::providers::{RawItem, SearchProvider};

struct FailingProvider(&'static str);

#[async_trait::async_trait]
impl SearchProvider for FailingProvider {
    async fn search(&self, _keyword: &str, _page_size: u32) -> anyhow::Result<Vec<RawItem>> {
        anyhow::bail!("upstream 500")
    }

    fn name(&self) -> &'static str {
        self.0
    }
}

// Single test: the recorder is process-global and can only be installed once.
#[tokio::test]
async fn exposition_has_help_text_and_counts_failed_fetches() {
    let metrics = Metrics::init(100);

    let ai: Arc<dyn AiDelegate> = Arc::new(StubDelegate::default());
    let agg = Aggregator::new(
        Arc::new(FailingProvider("naver-blog")),
        Arc::new(FailingProvider("naver-cafe")),
        Arc::new(FailingProvider("youtube")),
        Arc::new(FailingProvider("naver-news")),
        ai,
        Duration::from_secs(1),
        10,
    );
    let resp = agg.search_all("커피").await;
    assert!(resp.blog.is_none() && resp.news.is_none());

    let app = metrics.router();
    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    // Descriptions survive because they are registered after the recorder.
    assert!(
        text.contains("# HELP provider_errors_total Provider fetch/parse errors."),
        "missing HELP text:\n{text}"
    );
    assert!(text.contains("# HELP provider_fetch_ms Provider fetch time in milliseconds."));

    // All four failed fetches recorded a latency sample and an error count.
    assert!(text.contains("provider_fetch_ms_count 4"), "exposition:\n{text}");
    assert!(text.contains(r#"provider_errors_total{provider="naver-blog"} 1"#));
    assert!(text.contains("search_requests_total 1"));
    assert!(text.contains("search_branch_timeout_ms 100"));
}
