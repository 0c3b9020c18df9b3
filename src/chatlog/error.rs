use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("expected exactly 2 messages, got {got}")]
    WrongPairCount { got: usize },

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("failed to prepare log directory: {reason}")]
    Io { reason: String },

    #[error("log task failed: {reason}")]
    TaskFailed { reason: String },
}

impl LogError {
    /// True for errors caused by the caller's payload rather than the store.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::WrongPairCount { .. } | Self::MissingField { .. })
    }
}
