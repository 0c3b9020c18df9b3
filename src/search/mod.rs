//! Search backends producing unranked [`Candidate`]s.
//!
//! Backend order carries no relevance meaning; the ranking pipeline only uses
//! it to break ties.

pub mod bing;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod tavily;

#[cfg(test)]
mod tests;

pub use bing::{BingBackend, parse_bing_html};
pub use error::SearchError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockSearchBackend;
pub use tavily::TavilyBackend;

use serde::{Deserialize, Serialize};

/// One unranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub url: String,
    pub content: String,
    /// Full page text when the backend supplies it. Never returned to clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

impl Candidate {
    pub fn new(title: impl Into<String>, url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            raw_content: None,
        }
    }
}

#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Shortest query (in chars) the backend handles well. Shorter queries get
    /// padded by the pipeline.
    fn min_query_chars(&self) -> usize {
        0
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Candidate>, SearchError>;
}
