use super::*;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::browser::MockPageSource;
use crate::browser::http::build_client;

const MOCK_BING_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<ol id="b_results">
<li class="b_algo">
  <h2><a href="https://www.rust-lang.org/" h="ID=SERP">Rust Programming   Language</a></h2>
  <div class="b_caption"><p>A language empowering everyone
  to build reliable and efficient software.</p></div>
</li>
<li class="b_algo">
  <h2><a href="https://doc.rust-lang.org/book/">The Rust Book</a></h2>
  <div class="b_caption"><p class="b_lineclamp2">Learn Rust from the ground up.</p></div>
</li>
<li class="b_algo">
  <div class="b_caption"><p>No title, skipped.</p></div>
</li>
<li class="b_algo">
  <h2>Title without link</h2>
</li>
<li class="b_algo">
  <h2><a href="https://crates.io/">crates.io</a></h2>
</li>
</ol>
</body>
</html>"#;

fn client() -> reqwest::Client {
    build_client("test-agent", Duration::from_secs(5)).unwrap()
}

#[test]
fn test_parse_bing_html() {
    let results = parse_bing_html(MOCK_BING_HTML, 10).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].title, "Rust Programming Language");
    assert_eq!(results[0].url, "https://www.rust-lang.org/");
    assert_eq!(
        results[0].content,
        "A language empowering everyone to build reliable and efficient software."
    );
    assert_eq!(results[1].url, "https://doc.rust-lang.org/book/");
    assert_eq!(results[2].title, "crates.io");
    assert_eq!(results[2].content, "");
    assert!(results.iter().all(|r| r.raw_content.is_none()));
}

#[test]
fn test_parse_bing_html_respects_max_results() {
    let results = parse_bing_html(MOCK_BING_HTML, 1).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Rust Programming Language");
}

#[test]
fn test_parse_bing_html_empty_page() {
    let results = parse_bing_html("<html><body><p>captcha</p></body></html>", 10).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_bing_search_url_encodes_query() {
    let backend = BingBackend::new(Arc::new(MockPageSource::new()));
    let url = backend.search_url("rust 是什么 & more").unwrap();

    assert_eq!(url.host_str(), Some("cn.bing.com"));
    let (key, value) = url.query_pairs().next().unwrap();
    assert_eq!(key, "q");
    assert_eq!(value, "rust 是什么 & more");
}

#[tokio::test]
async fn test_bing_backend_uses_page_source() {
    let source = Arc::new(MockPageSource::new().with_fallback(MOCK_BING_HTML));
    let backend = BingBackend::new(source.clone()).with_base_url("https://bing.test/search");

    let results = backend.search("rust", 2).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(source.requested(), vec!["https://bing.test/search?q=rust"]);
    assert_eq!(backend.min_query_chars(), 0);
}

#[tokio::test]
async fn test_bing_backend_page_source_error() {
    let backend = BingBackend::new(Arc::new(MockPageSource::failing()));
    let err = backend.search("rust", 5).await.unwrap_err();
    assert!(matches!(err, SearchError::PageSource(_)));
}

#[derive(Default)]
struct Captured {
    auth: Option<String>,
    body: Option<Value>,
}

async fn fake_tavily(status: StatusCode, response: Value) -> (Arc<Mutex<Captured>>, String) {
    let captured = Arc::new(Mutex::new(Captured::default()));
    let state = captured.clone();

    let app = Router::new().route(
        "/search",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let state = state.clone();
            let response = response.clone();
            async move {
                let mut c = state.lock();
                c.auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                c.body = Some(body);
                (status, Json(response))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (captured, format!("http://{addr}/search"))
}

#[tokio::test]
async fn test_tavily_search() {
    let (captured, endpoint) = fake_tavily(
        StatusCode::OK,
        json!({
            "query": "what is rust",
            "results": [
                {
                    "title": "Rust",
                    "url": "https://www.rust-lang.org/",
                    "content": "Reliable and efficient software.",
                    "raw_content": "Full page text",
                    "score": 0.9
                },
                { "url": "https://example.com/", "content": null }
            ]
        }),
    )
    .await;

    let backend = TavilyBackend::new(client(), "tvly-test")
        .unwrap()
        .with_endpoint(endpoint);
    let results = backend.search("what is rust", 10).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Rust");
    assert_eq!(results[0].raw_content.as_deref(), Some("Full page text"));
    assert_eq!(results[1].title, "");
    assert_eq!(results[1].content, "");

    let c = captured.lock();
    assert_eq!(c.auth.as_deref(), Some("Bearer tvly-test"));
    let body = c.body.as_ref().unwrap();
    assert_eq!(body["query"], "what is rust");
    assert_eq!(body["max_results"], 10);
    assert_eq!(body["include_raw_content"], true);
}

#[tokio::test]
async fn test_tavily_http_error() {
    let (_captured, endpoint) =
        fake_tavily(StatusCode::UNAUTHORIZED, json!({ "detail": "bad key" })).await;

    let backend = TavilyBackend::new(client(), "tvly-bad")
        .unwrap()
        .with_endpoint(endpoint);
    let err = backend.search("what is rust", 10).await.unwrap_err();
    assert!(matches!(err, SearchError::Status { status: 401 }));
}

#[test]
fn test_tavily_requires_key() {
    assert!(matches!(
        TavilyBackend::new(client(), "  "),
        Err(SearchError::NotConfigured { .. })
    ));

    let backend = TavilyBackend::new(client(), "tvly-secret").unwrap();
    assert_eq!(backend.min_query_chars(), 5);
    assert!(!format!("{backend:?}").contains("tvly-secret"));
}

#[tokio::test]
async fn test_mock_backend_records_queries() {
    let backend = MockSearchBackend::new(vec![
        Candidate::new("a", "https://a.test/", "alpha"),
        Candidate::new("b", "https://b.test/", "beta"),
    ]);

    let results = backend.search("q", 1).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(backend.queries(), vec![("q".to_string(), 1)]);

    let failing = MockSearchBackend::failing("offline");
    assert!(failing.search("q", 1).await.is_err());
}

#[test]
fn test_candidate_serialization_omits_missing_raw_content() {
    let candidate = Candidate::new("t", "https://t.test/", "c");
    let value = serde_json::to_value(&candidate).unwrap();
    assert!(value.get("raw_content").is_none());
}
