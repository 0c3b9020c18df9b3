//! Search-and-rerank pipeline.
//!
//! A query is normalized, sent to the search backend with an oversampled
//! result count, each candidate's content is cut to the token budget, the batch
//! is scored against the query, and the top-k survive a stable descending
//! sort. Candidates whose score failed sort after every scored candidate.
//!
//! Backend failures never fail the request: they produce an empty result
//! with the error text attached.

pub mod error;
pub mod types;


pub use error::RankingError;
pub use types::{QueryPolicy, RankedResult, RankingPolicy, ScoredCandidate};

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use crate::scoring::RelevanceScorer;
use crate::search::{Candidate, SearchBackend};
use crate::tokenizer::TextTokenizer;

#[derive(Clone)]
pub struct RankingPipeline {
    backend: Arc<dyn SearchBackend>,
    tokenizer: Arc<dyn TextTokenizer>,
    scorer: Arc<dyn RelevanceScorer>,
    policy: RankingPolicy,
    query_policy: QueryPolicy,
}

impl std::fmt::Debug for RankingPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingPipeline")
            .field("backend", &self.backend.name())
            .field("policy", &self.policy)
            .field("query_policy", &self.query_policy)
            .finish()
    }
}

impl RankingPipeline {
    /// Default policies; the query threshold comes from the backend.
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        tokenizer: Arc<dyn TextTokenizer>,
        scorer: Arc<dyn RelevanceScorer>,
    ) -> Self {
        let query_policy = QueryPolicy {
            min_chars: backend.min_query_chars(),
            ..QueryPolicy::default()
        };
        Self {
            backend,
            tokenizer,
            scorer,
            policy: RankingPolicy::default(),
            query_policy,
        }
    }

    pub fn with_policy(mut self, policy: RankingPolicy) -> Result<Self, RankingError> {
        policy.validate()?;
        self.policy = policy;
        Ok(self)
    }

    pub fn with_query_policy(mut self, query_policy: QueryPolicy) -> Self {
        self.query_policy = query_policy;
        self
    }

    pub fn policy(&self) -> &RankingPolicy {
        &self.policy
    }

    pub fn query_policy(&self) -> &QueryPolicy {
        &self.query_policy
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Runs the full pipeline for one query.
    ///
    /// Errors only on an empty query or a scorer contract violation.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn rank(&self, query: &str) -> Result<RankedResult, RankingError> {
        let normalized = self.query_policy.normalize(query)?;
        let echo = query.trim().to_string();
        let start = Instant::now();

        let mut candidates = match self
            .backend
            .search(&normalized, self.policy.oversample)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, query = %normalized, "Search backend failed");
                return Ok(RankedResult {
                    query: echo,
                    results: Vec::new(),
                    response_time: start.elapsed().as_secs_f64(),
                    error: Some(e.to_string()),
                });
            }
        };
        candidates.truncate(self.policy.oversample);

        debug!(
            query = %normalized,
            candidates = candidates.len(),
            "Search backend returned candidates"
        );

        let mut results = if candidates.is_empty() {
            Vec::new()
        } else {
            let tokenizer = Arc::clone(&self.tokenizer);
            let scorer = Arc::clone(&self.scorer);
            let budget = self.policy.token_budget;
            let scoring_query = normalized.clone();

            tokio::task::spawn_blocking(move || {
                score_candidates(
                    tokenizer.as_ref(),
                    scorer.as_ref(),
                    &scoring_query,
                    candidates,
                    budget,
                )
            })
            .await
            .map_err(|e| RankingError::TaskFailed {
                reason: e.to_string(),
            })??
        };

        sort_by_score(&mut results);
        results.truncate(self.policy.top_k);

        let response_time = start.elapsed().as_secs_f64();
        debug!(
            returned = results.len(),
            top_score = results.first().and_then(|r| r.score),
            response_time,
            "Ranking complete"
        );

        Ok(RankedResult {
            query: echo,
            results,
            response_time,
            error: None,
        })
    }
}

/// Truncates each candidate's content to `budget` tokens and scores the batch.
///
/// Output is in input order. A candidate whose truncation or scoring failed
/// keeps `score: None`; `raw_content` is dropped.
pub(crate) fn score_candidates(
    tokenizer: &dyn TextTokenizer,
    scorer: &dyn RelevanceScorer,
    query: &str,
    mut candidates: Vec<Candidate>,
    budget: usize,
) -> Result<Vec<ScoredCandidate>, RankingError> {
    let mut scoreable = Vec::with_capacity(candidates.len());
    for candidate in candidates.iter_mut() {
        match tokenizer.truncate_to_tokens(&candidate.content, budget) {
            Ok(truncated) => {
                candidate.content = truncated.text;
                scoreable.push(true);
            }
            Err(e) => {
                warn!(error = %e, url = %candidate.url, "Failed to truncate candidate content");
                candidate.content.clear();
                scoreable.push(false);
            }
        }
    }

    let passages: Vec<&str> = candidates.iter().map(|c| c.content.as_str()).collect();
    let scores = scorer.score_batch(query, &passages);

    debug_assert_eq!(
        scores.len(),
        candidates.len(),
        "score batch misaligned with candidates"
    );
    if scores.len() != candidates.len() {
        return Err(RankingError::BatchMisaligned {
            expected: candidates.len(),
            got: scores.len(),
        });
    }

    Ok(candidates
        .into_iter()
        .zip(scores)
        .zip(scoreable)
        .map(|((candidate, score), ok)| {
            let score = match score {
                Ok(s) if ok && s.is_finite() => Some(s),
                Ok(s) if ok => {
                    warn!(score = s, url = %candidate.url, "Discarding non-finite score");
                    None
                }
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, url = %candidate.url, "Failed to score candidate");
                    None
                }
            };
            ScoredCandidate {
                title: candidate.title,
                url: candidate.url,
                content: candidate.content,
                score,
            }
        })
        .collect())
}

/// Stable sort, highest score first, unscored last.
pub fn sort_by_score(results: &mut [ScoredCandidate]) {
    results.sort_by(|a, b| match (a.score, b.score) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
