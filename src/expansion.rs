// src/expansion.rs
//! Naver SearchAd keyword-metrics client (`/keywordstool`).
//!
//! Requests are signed with HMAC-SHA256 over `"{timestamp}.{method}.{uri}"`
//! using the shared secret; the base64 digest travels in `X-Signature`.
//! Upstream rejects bad signatures itself — the error message is passed
//! through to the caller verbatim.

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Datelike, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use std::time::Duration;

const SEARCHAD_BASE: &str = "https://api.searchad.naver.com";
const KEYWORDSTOOL_URI: &str = "/keywordstool";

#[derive(Debug, Clone)]
pub struct SearchAdCredentials {
    pub api_key: String,
    pub secret_key: String,
    pub customer_id: String,
}

/// One row of the keyword-metrics table. Count/CTR fields arrive either as
/// numbers or as strings like `"< 10"`, so they stay untyped JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordMetrics {
    pub rel_keyword: String,
    #[serde(default)]
    pub monthly_pc_qc_cnt: Value,
    #[serde(default)]
    pub monthly_mobile_qc_cnt: Value,
    #[serde(default)]
    pub monthly_ave_pc_clk_cnt: Value,
    #[serde(default)]
    pub monthly_ave_mobile_clk_cnt: Value,
    #[serde(default)]
    pub monthly_ave_pc_ctr: Value,
    #[serde(default)]
    pub monthly_ave_mobile_ctr: Value,
    #[serde(default)]
    pub pl_avg_depth: Value,
    #[serde(default)]
    pub comp_idx: Value,
}

#[derive(Debug, Deserialize)]
struct ToolBody {
    #[serde(rename = "keywordList")]
    keyword_list: Option<Vec<KeywordMetrics>>,
}

/// HMAC-SHA256 signature over `"{timestamp}.{method}.{uri}"`, base64 encoded.
pub fn sign(secret_key: &str, timestamp: &str, method: &str, uri: &str) -> String {
    type HmacSha256 = Hmac<Sha256>;
    let message = format!("{timestamp}.{method}.{uri}");
    let mut mac =
        HmacSha256::new_from_slice(secret_key.as_bytes()).expect("hmac accepts any key length");
    mac.update(message.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

pub struct ExpansionClient {
    http: reqwest::Client,
    base_url: String,
}

impl ExpansionClient {
    pub fn new() -> Self {
        Self::with_base_url(SEARCHAD_BASE.to_string())
    }

    /// Test seam: point the client at a stub server.
    pub fn with_base_url(base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("keyword-scout/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self { http, base_url }
    }

    pub async fn expand(
        &self,
        creds: &SearchAdCredentials,
        keyword: &str,
    ) -> Result<Vec<KeywordMetrics>> {
        let timestamp = Utc::now().timestamp_millis().to_string();
        let signature = sign(&creds.secret_key, &timestamp, "GET", KEYWORDSTOOL_URI);
        let month = Utc::now().month().to_string();

        let resp = self
            .http
            .get(format!("{}{KEYWORDSTOOL_URI}", self.base_url))
            .query(&[
                ("hintKeywords", keyword),
                ("showDetail", "1"),
                ("customerId", &creds.customer_id),
                ("biztpId", "1"),
                ("event", "1"),
                ("month", &month),
            ])
            .header("X-Timestamp", &timestamp)
            .header("X-API-KEY", &creds.api_key)
            .header("X-Customer", &creds.customer_id)
            .header("X-Signature", &signature)
            .send()
            .await
            .context("keywordstool http get")?;

        let status = resp.status();
        let body = resp.text().await.context("keywordstool body")?;

        if !status.is_success() {
            // Pass the upstream message through when it has one.
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(body);
            bail!("keywordstool upstream error ({status}): {message}");
        }

        let parsed: ToolBody =
            serde_json::from_str(&body).context("parsing keywordstool json")?;
        match parsed.keyword_list {
            Some(list) => Ok(list),
            None => bail!("keywordstool response missing keywordList"),
        }
    }
}

impl Default for ExpansionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_known_vector() {
        // Verified against HMAC-SHA256("secret", "1700000000000.GET./keywordstool").
        let sig = sign("secret", "1700000000000", "GET", "/keywordstool");
        assert_eq!(sig, "A6Gzu+sW9C2ovLsH+T+rFrie81KwHy1xrodUFQERKf4=");
    }

    #[test]
    fn signature_changes_with_any_component() {
        let base = sign("secret", "1", "GET", "/keywordstool");
        assert_ne!(base, sign("secret2", "1", "GET", "/keywordstool"));
        assert_ne!(base, sign("secret", "2", "GET", "/keywordstool"));
        assert_ne!(base, sign("secret", "1", "POST", "/keywordstool"));
        assert_ne!(base, sign("secret", "1", "GET", "/other"));
    }

    #[test]
    fn metrics_rows_tolerate_mixed_count_types() {
        let body = r#"{"relKeyword": "커피", "monthlyPcQcCnt": "< 10",
                       "monthlyMobileQcCnt": 1200, "compIdx": "높음"}"#;
        let row: KeywordMetrics = serde_json::from_str(body).unwrap();
        assert_eq!(row.rel_keyword, "커피");
        assert_eq!(row.monthly_pc_qc_cnt, Value::String("< 10".into()));
        assert_eq!(row.monthly_mobile_qc_cnt, Value::from(1200));
        assert!(row.pl_avg_depth.is_null());
    }
}
