use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{RelevanceScorer, ScoringError};

/// Deterministic scorer for tests.
///
/// Passages containing a registered marker get that marker's score; everything
/// else is scored by lexical overlap with the query.
#[derive(Debug, Default)]
pub struct MockScorer {
    fixed: Vec<(String, f64)>,
    fail_containing: Option<String>,
    batches: AtomicUsize,
}

impl MockScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Passages containing `marker` score `score`. First registered match wins.
    pub fn with_score(mut self, marker: impl Into<String>, score: f64) -> Self {
        self.fixed.push((marker.into(), score));
        self
    }

    /// Passages containing `marker` fail to score.
    pub fn failing_on(mut self, marker: impl Into<String>) -> Self {
        self.fail_containing = Some(marker.into());
        self
    }

    /// Number of `score_batch` calls seen so far.
    pub fn batch_calls(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }
}

impl RelevanceScorer for MockScorer {
    fn score(&self, query: &str, passage: &str) -> Result<f64, ScoringError> {
        if let Some(ref marker) = self.fail_containing
            && passage.contains(marker.as_str())
        {
            return Err(ScoringError::ComputationFailed {
                reason: format!("mock scorer refuses passages containing '{marker}'"),
            });
        }

        if let Some((_, score)) = self
            .fixed
            .iter()
            .find(|(marker, _)| passage.contains(marker.as_str()))
        {
            return Ok(*score);
        }

        Ok(lexical_overlap(query, passage))
    }

    fn score_batch(&self, query: &str, passages: &[&str]) -> Vec<Result<f64, ScoringError>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        passages.iter().map(|p| self.score(query, p)).collect()
    }
}

/// Recall and Jaccard over lowercase alphanumeric words, squashed to (0, 1).
pub fn lexical_overlap(query: &str, passage: &str) -> f64 {
    let query_lower = query.to_lowercase();
    let query_words: HashSet<&str> = query_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let passage_lower = passage.to_lowercase();
    let passage_words: HashSet<&str> = passage_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    if query_words.is_empty() {
        return 0.0;
    }

    let matches = query_words.intersection(&passage_words).count();
    let recall = matches as f64 / query_words.len() as f64;

    let union = query_words.union(&passage_words).count();
    let jaccard = if union > 0 {
        matches as f64 / union as f64
    } else {
        0.0
    };

    let base_score = 0.6 * recall + 0.4 * jaccard;
    1.0 / (1.0 + (-8.0 * (base_score - 0.5)).exp())
}
