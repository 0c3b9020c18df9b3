use parking_lot::Mutex;

use super::{Candidate, SearchBackend, SearchError};

/// Returns canned candidates and records every query it receives.
#[derive(Debug, Default)]
pub struct MockSearchBackend {
    results: Vec<Candidate>,
    error: Option<String>,
    min_chars: usize,
    queries: Mutex<Vec<(String, usize)>>,
}

impl MockSearchBackend {
    pub fn new(results: Vec<Candidate>) -> Self {
        Self {
            results,
            ..Default::default()
        }
    }

    /// Every search fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn with_min_query_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// `(query, max_results)` for each call, in call order.
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().clone()
    }
}

#[async_trait::async_trait]
impl SearchBackend for MockSearchBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn min_query_chars(&self) -> usize {
        self.min_chars
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Candidate>, SearchError> {
        self.queries
            .lock()
            .push((query.to_string(), max_results));

        if let Some(ref reason) = self.error {
            return Err(SearchError::Request {
                reason: reason.clone(),
            });
        }

        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}
