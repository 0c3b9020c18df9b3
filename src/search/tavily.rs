use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{Candidate, SearchBackend, SearchError};

pub const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

/// Tavily rejects very short queries.
pub const TAVILY_MIN_QUERY_CHARS: usize = 5;

#[derive(Clone)]
pub struct TavilyBackend {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl std::fmt::Debug for TavilyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyBackend")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl TavilyBackend {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Result<Self, SearchError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SearchError::NotConfigured {
                reason: "empty Tavily API key".to_string(),
            });
        }
        Ok(Self {
            client,
            api_key,
            endpoint: TAVILY_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    url: String,
    title: Option<String>,
    content: Option<String>,
    raw_content: Option<String>,
}

#[async_trait::async_trait]
impl SearchBackend for TavilyBackend {
    fn name(&self) -> &'static str {
        "tavily"
    }

    fn min_query_chars(&self) -> usize {
        TAVILY_MIN_QUERY_CHARS
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Candidate>, SearchError> {
        let body = json!({
            "query": query,
            "max_results": max_results,
            "search_depth": "basic",
            "include_answer": false,
            "include_raw_content": true,
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let parsed: TavilyResponse = resp.json().await.map_err(|e| SearchError::Parse {
            reason: e.to_string(),
        })?;

        let candidates: Vec<Candidate> = parsed
            .results
            .into_iter()
            .map(|r| Candidate {
                title: r.title.unwrap_or_default(),
                url: r.url,
                content: r.content.unwrap_or_default(),
                raw_content: r.raw_content,
            })
            .collect();

        debug!(count = candidates.len(), "Tavily results received");
        Ok(candidates)
    }
}
