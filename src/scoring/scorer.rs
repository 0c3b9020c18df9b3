use tracing::debug;

use crate::reranker::{Reranker, RerankerConfig};

use super::RelevanceScorer;
use super::error::ScoringError;

pub struct CrossEncoderScorer {
    reranker: Reranker,
}

impl std::fmt::Debug for CrossEncoderScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossEncoderScorer")
            .field("reranker", &self.reranker)
            .finish()
    }
}

impl CrossEncoderScorer {
    pub fn new(config: RerankerConfig) -> Result<Self, ScoringError> {
        let reranker = Reranker::load(config)?;
        Ok(Self { reranker })
    }
}

impl RelevanceScorer for CrossEncoderScorer {
    fn score(&self, query: &str, passage: &str) -> Result<f64, ScoringError> {
        Ok(self.reranker.score(query, passage)?)
    }

    fn score_batch(&self, query: &str, passages: &[&str]) -> Vec<Result<f64, ScoringError>> {
        let scores: Vec<_> = self
            .reranker
            .score_batch(query, passages)
            .into_iter()
            .map(|r| r.map_err(ScoringError::from))
            .collect();

        debug!(
            scored = scores.iter().filter(|s| s.is_ok()).count(),
            failed = scores.iter().filter(|s| s.is_err()).count(),
            "Cross-encoder batch complete"
        );

        scores
    }
}
