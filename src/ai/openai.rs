// src/ai/openai.rs
//! OpenAI-backed [`AiDelegate`] (Chat Completions API).
//!
//! Every operation treats the model as an unreliable black box: structured
//! output is requested where the API supports it and the answer is always
//! schema-validated before use. Validation failures surface as
//! [`AiError::Malformed`]; the call sites decide whether a fallback applies.

use std::time::Duration;

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::keywords::KeywordFrequency;
use crate::providers::ContentItem;

use super::{
    fallback, AdAnalysis, AdEvaluation, AdImprovement, AdSuggestion, AiDelegate, AiError,
    ItemSentiment, OurAd, SentimentSummary,
};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiDelegate {
    http: reqwest::Client,
    api_key: String,
    /// Summaries and ad copy.
    chat_model: String,
    /// Sentiment, classification, Q&A, vision.
    analysis_model: String,
}

impl OpenAiDelegate {
    pub fn new(api_key: String, chat_model: String, analysis_model: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("keyword-scout/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            chat_model,
            analysis_model,
        }
    }

    /// POST a completion request and pull out the first choice's content.
    async fn complete(&self, body: Value) -> Result<String, AiError> {
        if self.api_key.is_empty() {
            return Err(AiError::Unavailable("OPENAI_API_KEY not set".to_string()));
        }

        let resp = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(AiError::Unavailable(format!("status {status}: {detail}")));
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: Option<String>,
        }

        let parsed: Resp = resp
            .json()
            .await
            .map_err(|e| AiError::Malformed(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AiError::Malformed("empty completion".to_string()))
    }

    fn chat_body(
        &self,
        model: &str,
        system: &str,
        user: &str,
        json_mode: bool,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Value {
        let mut body = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });
        if json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }
        if let Some(m) = max_tokens {
            body["max_tokens"] = json!(m);
        }
        if let Some(t) = temperature {
            body["temperature"] = json!(t);
        }
        body
    }
}

// ------------------------------------------------------------
// Prompt builders
// ------------------------------------------------------------

const SUMMARIZE_SYSTEM: &str = "당신은 검색 결과를 요약하는 전문가입니다. 다음 검색 결과에서 \
주어진 키워드와 관련된 중요한 정보를 추출하여 500자 내외로 요약해주세요. 요약은 한국어로 작성해야 합니다.";

const SENTIMENT_SYSTEM: &str = r#"당신은 텍스트의 감정을 분석하는 전문가입니다. 주어진 텍스트에서 다음 정보를 추출해주세요:
1. 긍정적, 부정적, 중립적 감정의 비율(%)
2. 가장 빈번한 긍정적 키워드 5개와 그 점수(1-10)
3. 가장 빈번한 부정적 키워드 5개와 그 점수(1-10)

응답은 다음 JSON 형식으로 제공해주세요:
{"positive": 숫자, "negative": 숫자, "neutral": 숫자,
 "positiveKeywords": [{"keyword": "단어", "score": 숫자}],
 "negativeKeywords": [{"keyword": "단어", "score": 숫자}]}

숫자만 제공하고 설명은 하지 마세요."#;

const CLASSIFY_SYSTEM: &str = r#"당신은 텍스트 감정 분류 전문가입니다. 번호가 매겨진 각 문서를 positive, negative, neutral 중 하나로 분류하고 0과 1 사이의 확신 점수를 부여하세요.

응답은 다음 JSON 형식으로 제공해주세요:
{"items": [{"index": 0, "sentiment": "positive", "score": 0.9}]}"#;

const AD_COPY_SYSTEM: &str = r#"당신은 온라인 광고 전문가입니다. 주어진 키워드, 컨텐츠, 키워드 분석, 감정 분석 정보를 바탕으로 효과적인 광고 소재 10개를 제안해주세요.

각 광고 소재는 headline(최대 45자), description(최대 90자), target(타겟 고객층)을 포함해야 합니다.

응답은 다음 JSON 형식으로 제공해주세요:
{"ads": [{"headline": "광고 제목", "description": "광고 설명", "target": "타겟 고객"}]}"#;

const QUERY_SYSTEM: &str = "당신은 디지털 마케팅과 키워드 분석 전문가입니다. \
데이터를 기반으로 통찰력 있는 분석을 제공합니다.";

fn ad_copy_user_prompt(
    keyword: &str,
    content: &str,
    keywords: &[KeywordFrequency],
    sentiment: Option<&SentimentSummary>,
) -> String {
    let top_keywords = keywords
        .iter()
        .take(5)
        .map(|k| k.keyword.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let sentiment_info = sentiment
        .map(|s| {
            let pos = s
                .positive_keywords
                .iter()
                .map(|k| k.keyword.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let neg = s
                .negative_keywords
                .iter()
                .map(|k| k.keyword.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "긍정적 비율: {}%\n부정적 비율: {}%\n중립적 비율: {}%\n긍정적 키워드: {pos}\n부정적 키워드: {neg}",
                s.positive, s.negative, s.neutral
            )
        })
        .unwrap_or_default();

    format!(
        "키워드: {keyword}\n\n컨텐츠 샘플:\n{content}\n\n관련 상위 키워드: {top_keywords}\n\n\
         감정 분석 정보:\n{sentiment_info}\n\n10개의 광고 소재 제안을 JSON 형식으로 제공해주세요."
    )
}

fn classify_user_prompt(items: &[ContentItem]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("{i}. {} — {}\n", item.title, item.description));
    }
    out
}

const VISION_SYSTEM: &str = r#"당신은 검색 광고 이미지 분석 전문가입니다. 업로드된 검색 결과 이미지에서 광고를 식별하고, 지정된 업체의 광고를 분석하여 다음 JSON 형식으로 제공해주세요:

{"ourAd": {"rank": 숫자, "evaluation": {"title": "광고 제목 평가", "description": "광고 설명 평가"}},
 "competitorAnalysis": "'1. [경쟁사명] - 분석내용' 형식으로 최소 3개의 경쟁사 광고 분석",
 "adSuggestions": [{"title": "제안 제목", "description": "제안 설명", "improvementPoints": "개선 포인트"}]}

광고 카피의 강점과 약점, 키워드 관련성, 타겟팅 전략, 클릭 유도 요소를 고려하세요."#;

// ------------------------------------------------------------
// Tolerant output parsing
// ------------------------------------------------------------

/// Accepts a bare array, `{"ads": [...]}`, or an `ad1..ad10` keyed object.
/// Returns `None` when no usable suggestion can be recovered.
pub fn parse_ad_suggestions(text: &str) -> Option<Vec<AdSuggestion>> {
    let value: Value = serde_json::from_str(text).ok()?;

    let from_array = |arr: &Value| -> Option<Vec<AdSuggestion>> {
        let parsed: Vec<AdSuggestion> = serde_json::from_value(arr.clone()).ok()?;
        (!parsed.is_empty()).then(|| parsed.into_iter().take(10).collect())
    };

    if value.is_array() {
        return from_array(&value);
    }
    if let Some(ads) = value.get("ads") {
        if ads.is_array() {
            return from_array(ads);
        }
    }

    // Some responses arrive as {"ad1": {...}, "ad2": {...}} with loose keys.
    let mut out = Vec::new();
    for i in 1..=10 {
        let ad = value
            .get(format!("ad{i}"))
            .or_else(|| value.get(i.to_string()));
        if let Some(ad) = ad {
            let pick = |a: &str, b: &str, or: String| {
                ad.get(a)
                    .or_else(|| ad.get(b))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or(or)
            };
            out.push(AdSuggestion {
                headline: pick("headline", "title", format!("광고 제목 {i}")),
                description: pick("description", "content", format!("광고 설명 {i}")),
                target: pick("target", "audience", "일반 사용자".to_string()),
            });
        }
    }
    (!out.is_empty()).then_some(out)
}

/// Accepts a bare array or `{"items": [...]}`.
pub fn parse_item_sentiments(text: &str) -> Option<Vec<ItemSentiment>> {
    let value: Value = serde_json::from_str(text).ok()?;
    let arr = if value.is_array() {
        value
    } else {
        value.get("items")?.clone()
    };
    serde_json::from_value(arr).ok()
}

/// First `{...}` block in free text; vision answers wrap JSON in prose.
fn extract_json_object(text: &str) -> Option<&str> {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").unwrap());
    re.find(text).map(|m| m.as_str())
}

/// Field-tolerant mapping of the vision answer. No JSON block at all means
/// the model could not read the image: the deterministic default applies.
/// A JSON block that fails to parse is a malformed answer.
pub fn parse_ad_analysis(text: &str) -> Result<AdAnalysis, AiError> {
    let Some(raw) = extract_json_object(text) else {
        return Ok(fallback::default_ad_analysis());
    };
    let value: Value =
        serde_json::from_str(raw).map_err(|e| AiError::Malformed(e.to_string()))?;

    let str_or = |v: Option<&Value>, or: &str| {
        v.and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| or.to_string())
    };

    let our_ad = value.get("ourAd");
    let evaluation = our_ad.and_then(|o| o.get("evaluation"));
    let rank = our_ad
        .and_then(|o| o.get("rank"))
        .and_then(Value::as_i64)
        .unwrap_or(0) as i32;

    let suggestions = value
        .get("adSuggestions")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .take(3)
                .map(|s| AdImprovement {
                    title: str_or(s.get("title"), "제목 제안 없음"),
                    description: str_or(s.get("description"), "설명 제안 없음"),
                    improvement_points: str_or(s.get("improvementPoints"), "개선 포인트 없음"),
                })
                .collect::<Vec<_>>()
        })
        .filter(|v| !v.is_empty())
        .unwrap_or_else(fallback::default_ad_improvements);

    Ok(AdAnalysis {
        our_ad: OurAd {
            rank,
            evaluation: AdEvaluation {
                title: str_or(evaluation.and_then(|e| e.get("title")), "평가할 수 없습니다"),
                description: str_or(
                    evaluation.and_then(|e| e.get("description")),
                    "평가할 수 없습니다",
                ),
            },
        },
        competitor_analysis: str_or(
            value.get("competitorAnalysis"),
            "분석 결과를 가져올 수 없습니다.",
        ),
        ad_suggestions: suggestions,
    })
}

// ------------------------------------------------------------
// Delegate implementation
// ------------------------------------------------------------

#[async_trait::async_trait]
impl AiDelegate for OpenAiDelegate {
    async fn summarize(&self, content: &str, keyword: &str) -> Result<String, AiError> {
        let system = format!("{SUMMARIZE_SYSTEM} 키워드: \"{keyword}\"");
        let body = self.chat_body(&self.chat_model, &system, content, false, Some(500), None);
        self.complete(body).await
    }

    async fn score_sentiment(&self, text: &str) -> Result<SentimentSummary, AiError> {
        let body = self.chat_body(&self.analysis_model, SENTIMENT_SYSTEM, text, true, None, None);
        let answer = self.complete(body).await?;
        serde_json::from_str(&answer).map_err(|e| AiError::Malformed(e.to_string()))
    }

    async fn classify_items(&self, items: &[ContentItem]) -> Result<Vec<ItemSentiment>, AiError> {
        let user = classify_user_prompt(items);
        let body = self.chat_body(&self.analysis_model, CLASSIFY_SYSTEM, &user, true, None, None);
        let answer = self.complete(body).await?;
        parse_item_sentiments(&answer)
            .ok_or_else(|| AiError::Malformed("classification shape".to_string()))
    }

    async fn generate_ad_copy(
        &self,
        keyword: &str,
        content: &str,
        keywords: &[KeywordFrequency],
        sentiment: Option<&SentimentSummary>,
    ) -> Result<Vec<AdSuggestion>, AiError> {
        let user = ad_copy_user_prompt(keyword, content, keywords, sentiment);
        let body = self.chat_body(
            &self.chat_model,
            AD_COPY_SYSTEM,
            &user,
            true,
            None,
            Some(0.7),
        );
        let answer = self.complete(body).await?;
        parse_ad_suggestions(&answer)
            .ok_or_else(|| AiError::Malformed("ad suggestion shape".to_string()))
    }

    async fn answer_query(
        &self,
        metrics_json: &Value,
        question: &str,
    ) -> Result<String, AiError> {
        let table = serde_json::to_string_pretty(metrics_json).unwrap_or_default();
        let user = format!(
            "다음은 키워드 검색 데이터입니다:\n{table}\n\n사용자 질문: {question}\n\n\
             위 데이터를 기반으로 전문가적인 관점에서 답변해주세요. 검색량, 클릭수, 클릭율, \
             경쟁정도 등을 종합적으로 고려하여 분석하고, 답변은 마크다운 형식으로 작성해주세요."
        );
        let body = self.chat_body(&self.analysis_model, QUERY_SYSTEM, &user, false, None, Some(0.7));
        self.complete(body).await
    }

    async fn analyze_ad_image(
        &self,
        image_base64: &str,
        keyword: &str,
        company: &str,
    ) -> Result<AdAnalysis, AiError> {
        let user_text = format!(
            "이 이미지는 '{keyword}' 키워드에 대한 검색 결과입니다. \
             '{company}' 업체 광고를 분석하고 순위, 평가, 개선점을 알려주세요."
        );
        let body = json!({
            "model": self.analysis_model,
            "messages": [
                { "role": "system", "content": VISION_SYSTEM },
                { "role": "user", "content": [
                    { "type": "text", "text": user_text },
                    { "type": "image_url",
                      "image_url": { "url": format!("data:image/jpeg;base64,{image_base64}") } },
                ]},
            ],
            "max_tokens": 1500,
        });
        let answer = self.complete(body).await?;
        parse_ad_analysis(&answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ad_suggestions_accept_bare_array() {
        let text = r#"[{"headline": "h", "description": "d", "target": "t"}]"#;
        let out = parse_ad_suggestions(text).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].headline, "h");
    }

    #[test]
    fn ad_suggestions_accept_ads_wrapper() {
        let text = r#"{"ads": [{"headline": "h", "description": "d", "target": "t"}]}"#;
        assert_eq!(parse_ad_suggestions(text).unwrap().len(), 1);
    }

    #[test]
    fn ad_suggestions_accept_keyed_object_with_loose_fields() {
        let text = r#"{"ad1": {"title": "t1", "content": "c1", "audience": "a1"},
                       "ad2": {"headline": "h2"}}"#;
        let out = parse_ad_suggestions(text).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].headline, "t1");
        assert_eq!(out[0].target, "a1");
        assert_eq!(out[1].description, "광고 설명 2");
    }

    #[test]
    fn ad_suggestions_reject_garbage() {
        assert!(parse_ad_suggestions("not json").is_none());
        assert!(parse_ad_suggestions(r#"{"unexpected": 1}"#).is_none());
        assert!(parse_ad_suggestions("[]").is_none());
    }

    #[test]
    fn item_sentiments_accept_both_shapes() {
        let bare = r#"[{"index": 0, "sentiment": "positive", "score": 0.9}]"#;
        assert_eq!(parse_item_sentiments(bare).unwrap().len(), 1);

        let wrapped = r#"{"items": [{"index": 1, "sentiment": "neutral", "score": 0.5}]}"#;
        let out = parse_item_sentiments(wrapped).unwrap();
        assert_eq!(out[0].index, 1);
    }

    #[test]
    fn ad_analysis_without_json_falls_back_to_default() {
        let out = parse_ad_analysis("죄송합니다. 이미지를 분석할 수 없습니다.").unwrap();
        assert_eq!(out.our_ad.rank, 0);
        assert_eq!(out.ad_suggestions.len(), 3);
    }

    #[test]
    fn ad_analysis_with_invalid_json_is_malformed() {
        assert!(matches!(
            parse_ad_analysis("prefix {broken json} suffix"),
            Err(AiError::Malformed(_))
        ));
    }

    #[test]
    fn ad_analysis_maps_fields_with_defaults() {
        let text = r#"분석 결과: {"ourAd": {"rank": 2, "evaluation": {"title": "좋음"}},
            "competitorAnalysis": "1. [A사] - 강함",
            "adSuggestions": [{"title": "t", "description": "d", "improvementPoints": "p"}]}"#;
        let out = parse_ad_analysis(text).unwrap();
        assert_eq!(out.our_ad.rank, 2);
        assert_eq!(out.our_ad.evaluation.title, "좋음");
        assert_eq!(out.our_ad.evaluation.description, "평가할 수 없습니다");
        assert_eq!(out.ad_suggestions.len(), 1);
    }
}
