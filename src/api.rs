// src/api.rs
//! Public HTTP surface. Handlers validate input, check the credentials the
//! endpoint needs, and drive the aggregation / AI / expansion pipelines.
//! Every request is stateless; nothing outlives the response.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;

use crate::aggregate::{analysis_text, content_sample, Aggregator, ContentType, SearchResponse};
use crate::ai::{
    ad_copy_or_fallback, classify_or_fallback, fallback, note_fallback, sentiment_or_fallback,
    AdAnalysis, AdSuggestion, AiDelegate, SentimentSummary,
};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::expansion::{ExpansionClient, KeywordMetrics};
use crate::keywords::{self, KeywordFrequency};
use crate::providers::ContentItem;

/// Uploaded ad screenshots are capped at 10MB.
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub ai: Arc<dyn AiDelegate>,
    pub expansion: Arc<ExpansionClient>,
    pub config: Arc<AppConfig>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", post(search))
        .route("/keyword-analysis", post(keyword_analysis))
        .route("/generate-ad-suggestions", post(generate_ad_suggestions))
        .route("/ad-analysis", post(ad_analysis))
        .route("/keyword-expansion", post(keyword_expansion))
        .route("/analyze-keywords", post(analyze_keywords))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

fn valid_keyword(raw: &str) -> Result<&str, ApiError> {
    let k = raw.trim();
    if k.is_empty() {
        return Err(ApiError::BadRequest("keyword is required".to_string()));
    }
    Ok(k)
}

fn require_naver(config: &AppConfig) -> Result<(), ApiError> {
    if config.naver_configured() {
        Ok(())
    } else {
        Err(ApiError::MissingConfig(
            "NAVER_CLIENT_ID / NAVER_CLIENT_SECRET".to_string(),
        ))
    }
}

// ------------------------------------------------------------
// POST /search
// ------------------------------------------------------------

#[derive(Deserialize)]
struct SearchReq {
    #[serde(default)]
    keyword: String,
}

async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchReq>,
) -> Result<Json<SearchResponse>, ApiError> {
    let keyword = valid_keyword(&req.keyword)?;
    require_naver(&state.config)?;
    Ok(Json(state.aggregator.search_all(keyword).await))
}

// ------------------------------------------------------------
// POST /keyword-analysis
// ------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisReq {
    #[serde(default)]
    keyword: String,
    content_type: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisResp {
    keywords: Vec<KeywordFrequency>,
    sentiment: SentimentSummary,
    content_items: Vec<ContentItem>,
    ad_suggestions: Vec<AdSuggestion>,
    content_type: &'static str,
}

async fn keyword_analysis(
    State(state): State<AppState>,
    Json(req): Json<AnalysisReq>,
) -> Result<Json<AnalysisResp>, ApiError> {
    let keyword = valid_keyword(&req.keyword)?;
    require_naver(&state.config)?;
    let content_type = ContentType::parse(req.content_type.as_deref());

    let mut items = state
        .aggregator
        .analysis_items(keyword, content_type, state.config.tunables.analysis_page_size)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    let keywords = keywords::extract(&items);
    let sentiment = sentiment_or_fallback(&*state.ai, &analysis_text(&items))
        .await
        .into_inner();

    // Per-item labels; indexes outside the batch keep their empty fields.
    for c in classify_or_fallback(&*state.ai, &items).await.into_inner() {
        if let Some(item) = items.get_mut(c.index) {
            item.sentiment = Some(c.sentiment);
            item.sentiment_score = Some(c.score);
        }
    }

    let ad_suggestions = ad_copy_or_fallback(
        &*state.ai,
        keyword,
        &content_sample(&items),
        &keywords,
        Some(&sentiment),
    )
    .await
    .into_inner();

    Ok(Json(AnalysisResp {
        keywords,
        sentiment,
        content_items: items,
        ad_suggestions,
        content_type: content_type.as_str(),
    }))
}

// ------------------------------------------------------------
// POST /generate-ad-suggestions
// ------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestReq {
    #[serde(default)]
    keyword: String,
    content_type: Option<String>,
    product_description: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestResp {
    ad_suggestions: Vec<AdSuggestion>,
}

/// Standalone generation endpoint. Any failure along the way (provider
/// fetch, model call, output shape) degrades to the 3-entry template set;
/// this endpoint never 500s on upstream trouble.
async fn generate_ad_suggestions(
    State(state): State<AppState>,
    Json(req): Json<SuggestReq>,
) -> Result<Json<SuggestResp>, ApiError> {
    let keyword = valid_keyword(&req.keyword)?;
    require_naver(&state.config)?;
    let content_type = ContentType::parse(req.content_type.as_deref());

    let ad_suggestions = match state
        .aggregator
        .analysis_items(keyword, content_type, state.config.tunables.suggestion_page_size)
        .await
    {
        Ok(items) => {
            let mut content = content_sample(&items);
            if let Some(pd) = req.product_description.as_deref().filter(|s| !s.is_empty()) {
                content.push_str(&format!("\n\n제품 설명: {pd}"));
            }
            match state.ai.generate_ad_copy(keyword, &content, &[], None).await {
                Ok(v) => v,
                Err(e) => {
                    note_fallback("generate_ad_copy", &e);
                    fallback::short_ad_suggestions(keyword)
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = ?e, "suggestion content fetch failed, using templates");
            fallback::short_ad_suggestions(keyword)
        }
    };

    Ok(Json(SuggestResp { ad_suggestions }))
}

// ------------------------------------------------------------
// POST /ad-analysis (multipart)
// ------------------------------------------------------------

async fn ad_analysis(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AdAnalysis>, ApiError> {
    let mut keyword: Option<String> = None;
    let mut company: Option<String> = None;
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("keyword") => {
                keyword = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("invalid keyword field: {e}"))
                })?);
            }
            Some("companyName") => {
                company = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("invalid companyName field: {e}"))
                })?);
            }
            Some("image") => {
                let is_image = field
                    .content_type()
                    .is_some_and(|ct| ct.starts_with("image/"));
                if !is_image {
                    return Err(ApiError::BadRequest(
                        "image field must be an image upload".to_string(),
                    ));
                }
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("failed to read image: {e}"))
                })?;
                if bytes.len() > MAX_IMAGE_BYTES {
                    return Err(ApiError::BadRequest("image exceeds 10MB".to_string()));
                }
                image = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let keyword = keyword
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("keyword is required".to_string()))?;
    let company = company
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("companyName is required".to_string()))?;
    let image = image.ok_or_else(|| ApiError::BadRequest("image is required".to_string()))?;

    let encoded = STANDARD.encode(&image);
    let analysis = state
        .ai
        .analyze_ad_image(&encoded, keyword.trim(), company.trim())
        .await?;
    Ok(Json(analysis))
}

// ------------------------------------------------------------
// POST /keyword-expansion
// ------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExpansionData {
    keyword: String,
    timestamp: String,
    status: &'static str,
    keyword_list: Vec<KeywordMetrics>,
}

#[derive(Serialize)]
struct ExpansionResp {
    message: &'static str,
    data: ExpansionData,
}

async fn keyword_expansion(
    State(state): State<AppState>,
    Json(req): Json<SearchReq>,
) -> Result<Json<ExpansionResp>, ApiError> {
    let keyword = valid_keyword(&req.keyword)?;
    let creds = state
        .config
        .searchad
        .clone()
        .ok_or_else(|| ApiError::MissingConfig("SEARCHAD_* credentials".to_string()))?;

    let keyword_list = state
        .expansion
        .expand(&creds, keyword)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(Json(ExpansionResp {
        message: "success",
        data: ExpansionData {
            keyword: keyword.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            status: "success",
            keyword_list,
        },
    }))
}

// ------------------------------------------------------------
// POST /analyze-keywords
// ------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryReq {
    #[serde(default)]
    keyword_data: Value,
    #[serde(default)]
    user_query: String,
}

#[derive(Serialize)]
struct QueryResp {
    analysis: String,
}

/// Free-form Q&A has no deterministic fallback: a model failure here is a
/// plain 500, unlike the generation endpoints.
async fn analyze_keywords(
    State(state): State<AppState>,
    Json(req): Json<QueryReq>,
) -> Result<Json<QueryResp>, ApiError> {
    if req.user_query.trim().is_empty() {
        return Err(ApiError::BadRequest("userQuery is required".to_string()));
    }
    let analysis = state.ai.answer_query(&req.keyword_data, &req.user_query).await?;
    Ok(Json(QueryResp { analysis }))
}
