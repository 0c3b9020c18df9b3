//! Cross-cutting, shared constants.
//!
//! Ranking policy values live here so the pipeline, the config layer and the
//! tests agree on them.

/// Number of ranked results returned to the caller.
pub const DEFAULT_TOP_K: usize = 3;

/// Per-candidate content budget (tokens) before scoring.
pub const DEFAULT_TOKEN_BUDGET: usize = 200;

/// Candidates requested from the search backend. Must be at least [`DEFAULT_TOP_K`].
pub const DEFAULT_OVERSAMPLE: usize = 10;

/// Appended to passages that were cut to fit a token budget.
pub const TRUNCATION_MARKER: &str = "...";

/// Returned by the visit-URL flow when extraction produced no text.
pub const NO_TEXT_SENTINEL: &str = "No text content found.";

/// Suffix appended to queries below the minimum length.
pub const DEFAULT_QUERY_SUFFIX: &str = " 是什么";

/// Max tokens per (query, passage) pair fed to the cross-encoder.
pub const RERANKER_MAX_SEQ_LEN: usize = 512;

/// Desktop Chrome user agent used by the HTTP fetcher and the browser session.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// Timeout applied to outbound search and fetch requests.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;
