use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("score batch misaligned: {expected} candidates, {got} scores")]
    BatchMisaligned { expected: usize, got: usize },

    #[error("ranking task failed: {reason}")]
    TaskFailed { reason: String },

    #[error("invalid ranking policy: {reason}")]
    InvalidPolicy { reason: String },
}
