//! Relevance scoring of (query, passage) pairs.
//!
//! [`RelevanceScorer`] is the seam the ranking pipeline calls. The production
//! implementation is [`CrossEncoderScorer`], which wraps the
//! [`Reranker`](crate::reranker::Reranker). Scores are only comparable within
//! a single query; higher means more relevant.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod scorer;


pub use error::ScoringError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockScorer;
pub use scorer::CrossEncoderScorer;

/// Scores passages against a query.
pub trait RelevanceScorer: Send + Sync {
    fn score(&self, query: &str, passage: &str) -> Result<f64, ScoringError>;

    /// One result per passage, in input order. A failure only affects its own slot.
    fn score_batch(&self, query: &str, passages: &[&str]) -> Vec<Result<f64, ScoringError>> {
        passages.iter().map(|p| self.score(query, p)).collect()
    }
}
