//! Tokenizer adapter: encode, decode, count and budgeted truncation.
//!
//! [`TextTokenizer`] is the seam the ranking pipeline and the `/tokenize`
//! route depend on. [`HfTokenizer`] is the production implementation backed by
//! a `tokenizer.json`; tests use [`MockTokenizer`].

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use error::TokenizerError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTokenizer;

use std::io;
use std::path::Path;

use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::constants::TRUNCATION_MARKER;

/// Output of [`TextTokenizer::truncate_to_tokens`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated {
    pub text: String,
    /// True when the input exceeded the budget. The marker is present unless the
    /// budget was too small to hold it.
    pub truncated: bool,
}

/// Token-level view of text for one specific vocabulary.
pub trait TextTokenizer: Send + Sync {
    /// Token ids without special tokens.
    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError>;

    /// Best-effort inverse of [`encode`](Self::encode).
    fn decode(&self, ids: &[u32]) -> Result<String, TokenizerError>;

    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(self.encode(text)?.len())
    }

    /// Cuts `text` so that it counts at most `max_tokens`, marker included.
    ///
    /// Text already within budget is returned unchanged, which makes the
    /// operation idempotent.
    fn truncate_to_tokens(
        &self,
        text: &str,
        max_tokens: usize,
    ) -> Result<Truncated, TokenizerError> {
        let ids = self.encode(text)?;
        if ids.len() <= max_tokens {
            return Ok(Truncated {
                text: text.to_string(),
                truncated: false,
            });
        }

        // Decoding can merge or split tokens, so every candidate is re-counted.
        let mut n = max_tokens.min(ids.len());
        loop {
            let mut candidate = self.decode(&ids[..n])?;
            candidate.push_str(TRUNCATION_MARKER);
            if self.count(&candidate)? <= max_tokens {
                return Ok(Truncated {
                    text: candidate,
                    truncated: true,
                });
            }
            if n == 0 {
                break;
            }
            n -= 1;
        }

        // Budget smaller than the marker itself.
        let mut n = max_tokens.min(ids.len());
        while n > 0 {
            let candidate = self.decode(&ids[..n])?;
            if self.count(&candidate)? <= max_tokens {
                return Ok(Truncated {
                    text: candidate,
                    truncated: true,
                });
            }
            n -= 1;
        }

        Ok(Truncated {
            text: String::new(),
            truncated: true,
        })
    }
}

/// [`TextTokenizer`] backed by a Hugging Face `tokenizer.json`.
pub struct HfTokenizer {
    inner: Tokenizer,
}

impl std::fmt::Debug for HfTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfTokenizer")
            .field("vocab_size", &self.inner.get_vocab_size(true))
            .finish()
    }
}

impl HfTokenizer {
    /// Loads from a `tokenizer.json` file or a directory containing one.
    ///
    /// Any truncation or padding baked into the file is disabled so that counts
    /// reflect the full text.
    pub fn load(path: &Path) -> Result<Self, TokenizerError> {
        if !path.exists() {
            return Err(TokenizerError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let mut inner = load_tokenizer(path).map_err(|e| TokenizerError::LoadFailed {
            reason: e.to_string(),
        })?;
        inner
            .with_truncation(None)
            .map_err(|e| TokenizerError::LoadFailed {
                reason: format!("failed to disable truncation: {e}"),
            })?;
        inner.with_padding(None);

        info!(
            path = %path.display(),
            vocab_size = inner.get_vocab_size(true),
            "Tokenizer loaded"
        );

        Ok(Self { inner })
    }
}

impl TextTokenizer for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        let encoding =
            self.inner
                .encode(text, false)
                .map_err(|e| TokenizerError::EncodeFailed {
                    reason: e.to_string(),
                })?;
        debug!(tokens = encoding.len(), "Encoded text");
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, TokenizerError> {
        self.inner
            .decode(ids, true)
            .map_err(|e| TokenizerError::DecodeFailed {
                reason: e.to_string(),
            })
    }
}

/// Loads a tokenizer from a model directory or explicit tokenizer.json path.
pub fn load_tokenizer(model_path: &Path) -> io::Result<Tokenizer> {
    let tokenizer_path = if model_path
        .file_name()
        .is_some_and(|name| name == std::ffi::OsStr::new("tokenizer.json"))
    {
        model_path.to_path_buf()
    } else if model_path.is_dir() {
        model_path.join("tokenizer.json")
    } else {
        model_path.to_path_buf()
    };

    Tokenizer::from_file(&tokenizer_path).map_err(io::Error::other)
}

/// Loads a tokenizer with truncation enabled for a maximum sequence length.
///
/// Cross-encoders have a fixed maximum sequence length; longer pairs are cut
/// (longest side first) to fit.
pub fn load_tokenizer_with_truncation(model_path: &Path, max_len: usize) -> io::Result<Tokenizer> {
    use tokenizers::TruncationParams;

    let mut tokenizer = load_tokenizer(model_path)?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    Ok(tokenizer)
}
