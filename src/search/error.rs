use thiserror::Error;

use crate::browser::PageSourceError;

/// Errors from a search backend. The ranking pipeline turns these into a
/// diagnostic string rather than failing the request.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {reason}")]
    Request { reason: String },

    #[error("search backend returned HTTP {status}")]
    Status { status: u16 },

    #[error("failed to parse search response: {reason}")]
    Parse { reason: String },

    #[error("page source error: {0}")]
    PageSource(#[from] PageSourceError),

    #[error("search backend not configured: {reason}")]
    NotConfigured { reason: String },
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request {
            reason: e.to_string(),
        }
    }
}
