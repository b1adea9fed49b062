//! Keyword Scout — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the search providers, the AI
//! delegate, and the metrics exporter into shared state.

use std::sync::Arc;
use std::time::Duration;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use keyword_scout::aggregate::Aggregator;
use keyword_scout::ai::{openai::OpenAiDelegate, AiDelegate};
use keyword_scout::api::{self, AppState};
use keyword_scout::config::AppConfig;
use keyword_scout::expansion::ExpansionClient;
use keyword_scout::metrics::Metrics;
use keyword_scout::providers::naver::{NaverSearchProvider, Vertical};
use keyword_scout::providers::youtube::YoutubeProvider;
use keyword_scout::providers::SearchProvider;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - SCOUT_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("SCOUT_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("keyword_scout=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let config = Arc::new(AppConfig::from_env());
    let tunables = &config.tunables;

    // Clients are constructed here and injected through AppState; nothing
    // reads credentials from module-level globals.
    let naver_id = config.naver_client_id.clone().unwrap_or_default();
    let naver_secret = config.naver_client_secret.clone().unwrap_or_default();
    let blog: Arc<dyn SearchProvider> = Arc::new(NaverSearchProvider::new(
        Vertical::Blog,
        naver_id.clone(),
        naver_secret.clone(),
    ));
    let cafe: Arc<dyn SearchProvider> = Arc::new(NaverSearchProvider::new(
        Vertical::Cafe,
        naver_id.clone(),
        naver_secret.clone(),
    ));
    let news: Arc<dyn SearchProvider> = Arc::new(NaverSearchProvider::new(
        Vertical::News,
        naver_id,
        naver_secret,
    ));
    let video: Arc<dyn SearchProvider> =
        Arc::new(YoutubeProvider::new(config.youtube_api_key.clone()));

    let ai: Arc<dyn AiDelegate> = Arc::new(OpenAiDelegate::new(
        config.openai_api_key.clone().unwrap_or_default(),
        tunables.chat_model.clone(),
        tunables.analysis_model.clone(),
    ));

    let branch_timeout = Duration::from_secs(tunables.branch_timeout_secs);
    let aggregator = Arc::new(Aggregator::new(
        blog,
        cafe,
        video,
        news,
        ai.clone(),
        branch_timeout,
        tunables.search_page_size,
    ));

    let metrics = Metrics::init(branch_timeout.as_millis() as u64);

    let state = AppState {
        aggregator,
        ai,
        expansion: Arc::new(ExpansionClient::new()),
        config,
    };
    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
