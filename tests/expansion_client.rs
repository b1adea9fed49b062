// tests/expansion_client.rs
// Drives the SearchAd client against an in-process stub server and checks
// the signed request shape plus error passthrough.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::routing::get;
use http::{HeaderMap, StatusCode};
use axum::{Json, Router};
use serde_json::json;

use keyword_scout::expansion::{sign, ExpansionClient, SearchAdCredentials};

type Captured = Arc<Mutex<Option<(HashMap<String, String>, HashMap<String, String>)>>>;

async fn stub_keywordstool(
    State(captured): State<Captured>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let headers = headers
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();
    *captured.lock().unwrap() = Some((query, headers));
    Json(json!({
        "keywordList": [
            { "relKeyword": "커피숍", "monthlyPcQcCnt": "< 10", "monthlyMobileQcCnt": 1200 }
        ]
    }))
}

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn creds() -> SearchAdCredentials {
    SearchAdCredentials {
        api_key: "ak".to_string(),
        secret_key: "sk".to_string(),
        customer_id: "123".to_string(),
    }
}

#[tokio::test]
async fn expand_sends_signed_request_and_parses_rows() {
    let captured: Captured = Arc::default();
    let router = Router::new()
        .route("/keywordstool", get(stub_keywordstool))
        .with_state(captured.clone());
    let base = spawn_stub(router).await;

    let rows = ExpansionClient::with_base_url(base)
        .expand(&creds(), "커피")
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].rel_keyword, "커피숍");
    assert_eq!(rows[0].monthly_pc_qc_cnt, json!("< 10"));

    let (query, headers) = captured.lock().unwrap().clone().unwrap();
    assert_eq!(query.get("hintKeywords").map(String::as_str), Some("커피"));
    assert_eq!(query.get("showDetail").map(String::as_str), Some("1"));
    assert_eq!(query.get("customerId").map(String::as_str), Some("123"));
    assert_eq!(headers.get("x-api-key").map(String::as_str), Some("ak"));
    assert_eq!(headers.get("x-customer").map(String::as_str), Some("123"));

    // The signature must match the timestamp the request actually carried.
    let timestamp = headers.get("x-timestamp").unwrap();
    assert_eq!(
        headers.get("x-signature").unwrap(),
        &sign("sk", timestamp, "GET", "/keywordstool")
    );
}

#[tokio::test]
async fn expand_passes_upstream_error_message_through() {
    let router = Router::new().route(
        "/keywordstool",
        get(|| async {
            (
                StatusCode::FORBIDDEN,
                Json(json!({ "message": "Invalid signature" })),
            )
        }),
    );
    let base = spawn_stub(router).await;

    let err = ExpansionClient::with_base_url(base)
        .expand(&creds(), "커피")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid signature"));
}

#[tokio::test]
async fn expand_rejects_body_without_keyword_list() {
    let router = Router::new().route(
        "/keywordstool",
        get(|| async { Json(json!({ "unexpected": true })) }),
    );
    let base = spawn_stub(router).await;

    let err = ExpansionClient::with_base_url(base)
        .expand(&creds(), "커피")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("keywordList"));
}
