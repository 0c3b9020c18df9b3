//! Scout library crate (used by the server binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Core
//! - [`RankingPipeline`], [`RankedResult`] - search, truncate, rerank, top-k
//! - [`TextTokenizer`], [`HfTokenizer`] - token counting and budgeted truncation
//! - [`RelevanceScorer`], [`CrossEncoderScorer`] - pairwise relevance scores
//!
//! ## Collaborators
//! - [`SearchBackend`] with [`TavilyBackend`] and [`BingBackend`]
//! - [`PageSource`] with [`HttpFetcher`] and [`BrowserSession`]
//! - [`ContentExtractor`] - readable text for the visit-URL tool
//! - [`ChatLog`] - append-only conversation log
//!
//! ## Server
//! - [`Config`], [`ConfigError`] - environment configuration
//! - [`gateway`] - Axum router and handlers
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod browser;
pub mod chatlog;
pub mod config;
pub mod constants;
pub mod extract;
pub mod gateway;
pub mod ranking;
pub mod reranker;
pub mod scoring;
pub mod search;
pub mod tokenizer;

pub use browser::{BrowserOptions, BrowserSession, HttpFetcher, PageSource, PageSourceError};
#[cfg(any(test, feature = "mock"))]
pub use browser::MockPageSource;
pub use chatlog::{ChatLog, LogEntry, LogError};
pub use config::{Config, ConfigError, PageSourceKind, SearchBackendKind};
pub use extract::{ContentExtractor, ExtractedContent, readable_text};
pub use ranking::{
    QueryPolicy, RankedResult, RankingError, RankingPipeline, RankingPolicy, ScoredCandidate,
};
pub use reranker::{Reranker, RerankerConfig, RerankerError};
#[cfg(any(test, feature = "mock"))]
pub use scoring::MockScorer;
pub use scoring::{CrossEncoderScorer, RelevanceScorer, ScoringError};
#[cfg(any(test, feature = "mock"))]
pub use search::MockSearchBackend;
pub use search::{BingBackend, Candidate, SearchBackend, SearchError, TavilyBackend};
#[cfg(any(test, feature = "mock"))]
pub use tokenizer::MockTokenizer;
pub use tokenizer::{HfTokenizer, TextTokenizer, TokenizerError, Truncated};
