use serde::Serialize;

use crate::constants::{DEFAULT_OVERSAMPLE, DEFAULT_QUERY_SUFFIX, DEFAULT_TOKEN_BUDGET, DEFAULT_TOP_K};

use super::error::RankingError;

/// Size knobs for one ranking run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingPolicy {
    /// Results returned.
    pub top_k: usize,
    /// Max tokens of content kept per candidate.
    pub token_budget: usize,
    /// Candidates requested from the backend.
    pub oversample: usize,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            token_budget: DEFAULT_TOKEN_BUDGET,
            oversample: DEFAULT_OVERSAMPLE,
        }
    }
}

impl RankingPolicy {
    pub fn validate(&self) -> Result<(), RankingError> {
        if self.top_k == 0 {
            return Err(RankingError::InvalidPolicy {
                reason: "top_k must be at least 1".to_string(),
            });
        }
        if self.oversample < self.top_k {
            return Err(RankingError::InvalidPolicy {
                reason: format!(
                    "oversample ({}) must be at least top_k ({})",
                    self.oversample, self.top_k
                ),
            });
        }
        Ok(())
    }
}

/// Pads queries that are too short for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPolicy {
    /// Queries with fewer chars than this get `suffix` appended.
    pub min_chars: usize,
    pub suffix: String,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            min_chars: 0,
            suffix: DEFAULT_QUERY_SUFFIX.to_string(),
        }
    }
}

impl QueryPolicy {
    pub fn new(min_chars: usize, suffix: impl Into<String>) -> Self {
        Self {
            min_chars,
            suffix: suffix.into(),
        }
    }

    /// Trims and pads. Character counts, not bytes.
    pub fn normalize(&self, query: &str) -> Result<String, RankingError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(RankingError::EmptyQuery);
        }

        if trimmed.chars().count() < self.min_chars {
            Ok(format!("{trimmed}{}", self.suffix))
        } else {
            Ok(trimmed.to_string())
        }
    }
}

/// A candidate after truncation and scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub title: String,
    pub url: String,
    pub content: String,
    /// `None` when the scorer failed for this candidate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Final output of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub query: String,
    pub results: Vec<ScoredCandidate>,
    /// Seconds from backend call to assembled result.
    pub response_time: f64,
    /// Backend failure text. Present only when the search itself failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
