use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("tokenizer not found at path: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to load tokenizer: {reason}")]
    LoadFailed { reason: String },

    #[error("encoding failed: {reason}")]
    EncodeFailed { reason: String },

    #[error("decoding failed: {reason}")]
    DecodeFailed { reason: String },
}
