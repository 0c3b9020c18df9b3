//! Cross-encoder reranker: scores (query, passage) pairs with a sequence classifier.
//!
//! Scores are raw logits. They are comparable within one query only.

pub mod classifier;
pub mod config;
pub mod device;
pub mod error;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::{DEFAULT_MAX_BATCH, MAX_SEQ_LEN, RerankerConfig};
pub use error::RerankerError;

use candle_core::{Device, Tensor};
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info, warn};

use crate::tokenizer::load_tokenizer_with_truncation;
use classifier::SequenceClassifier;
use device::select_device;

pub struct Reranker {
    device: Device,
    config: RerankerConfig,
    model: SequenceClassifier,
    tokenizer: Tokenizer,
    pad_id: u32,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("pad_id", &self.pad_id)
            .finish()
    }
}

impl Reranker {
    /// Loads the classifier and its tokenizer. Any failure here is startup-fatal.
    pub fn load(config: RerankerConfig) -> Result<Self, RerankerError> {
        if let Err(msg) = config.validate() {
            return Err(RerankerError::InvalidConfig { reason: msg });
        }

        let model_path = &config.model_path;
        if !model_path.exists() {
            return Err(RerankerError::ModelNotFound {
                path: model_path.clone(),
            });
        }

        for required in ["config.json", "model.safetensors", "tokenizer.json"] {
            if !model_path.join(required).exists() {
                return Err(RerankerError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", required, model_path.display()),
                });
            }
        }

        let device = select_device();
        debug!(?device, "Selected compute device for reranker");

        info!(
            model_path = %model_path.display(),
            max_seq_len = config.max_seq_len,
            "Loading reranker model"
        );

        let model = SequenceClassifier::load(model_path, &device).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("Failed to load classifier: {}", e),
            }
        })?;

        let tokenizer = load_tokenizer_with_truncation(model_path, config.max_seq_len)
            .map_err(|e| RerankerError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            })?;

        // XLM-RoBERTa derives positions from the checkpoint's pad id, so padding must use it.
        let pad_id = model.pad_token_id();
        if let Some(tokenizer_pad) = tokenizer
            .get_padding()
            .map(|p| p.pad_id)
            .or_else(|| tokenizer.token_to_id("<pad>"))
            .or_else(|| tokenizer.token_to_id("[PAD]"))
            && tokenizer_pad != pad_id
        {
            warn!(
                tokenizer_pad,
                model_pad = pad_id,
                "Tokenizer and model disagree on the pad id, using the model's"
            );
        }

        info!(
            pad_id,
            xlm_roberta = model.is_xlm_roberta(),
            token_types = model.uses_token_types(),
            "Reranker model loaded successfully"
        );

        Ok(Self {
            device,
            config,
            model,
            tokenizer,
            pad_id,
        })
    }

    /// Scores one pair.
    pub fn score(&self, query: &str, passage: &str) -> Result<f64, RerankerError> {
        let encoding = self.encode_pair(query, passage)?;
        let logits = self.forward(&[&encoding])?;
        finite(logits[0])
    }

    /// Scores every passage against `query`, one result per input position.
    ///
    /// Pairs are encoded individually so a passage that fails to tokenize only
    /// poisons its own slot. Encoded pairs run through padded batches; if a
    /// whole batch fails, its members are retried one at a time.
    pub fn score_batch(&self, query: &str, passages: &[&str]) -> Vec<Result<f64, RerankerError>> {
        debug!(
            query_len = query.len(),
            num_passages = passages.len(),
            "Scoring passage batch"
        );

        let mut results: Vec<Option<Result<f64, RerankerError>>> =
            (0..passages.len()).map(|_| None).collect();
        let mut encoded: Vec<(usize, Encoding)> = Vec::with_capacity(passages.len());

        for (idx, passage) in passages.iter().enumerate() {
            match self.encode_pair(query, passage) {
                Ok(encoding) => encoded.push((idx, encoding)),
                Err(e) => results[idx] = Some(Err(e)),
            }
        }

        for chunk in encoded.chunks(self.config.max_batch) {
            let encodings: Vec<&Encoding> = chunk.iter().map(|(_, e)| e).collect();
            match self.forward(&encodings) {
                Ok(logits) => {
                    for ((idx, _), logit) in chunk.iter().zip(logits) {
                        results[*idx] = Some(finite(logit));
                    }
                }
                Err(e) => {
                    warn!(error = %e, size = chunk.len(), "Batch forward failed, scoring pairs individually");
                    for (idx, encoding) in chunk {
                        results[*idx] =
                            Some(self.forward(&[encoding]).and_then(|logits| finite(logits[0])));
                    }
                }
            }
        }

        results
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(RerankerError::InferenceFailed {
                        reason: "pair was never scored".to_string(),
                    })
                })
            })
            .collect()
    }

    fn encode_pair(&self, query: &str, passage: &str) -> Result<Encoding, RerankerError> {
        self.tokenizer
            .encode((query, passage), true)
            .map_err(|e| RerankerError::TokenizationFailed {
                reason: e.to_string(),
            })
    }

    /// Runs one right-padded forward pass and returns one logit per encoding.
    fn forward(&self, encodings: &[&Encoding]) -> Result<Vec<f32>, RerankerError> {
        let batch = encodings.len();
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        if batch == 0 || max_len == 0 {
            return Err(RerankerError::InferenceFailed {
                reason: "empty encoding".to_string(),
            });
        }

        let mut ids = Vec::with_capacity(batch * max_len);
        let mut type_ids = Vec::with_capacity(batch * max_len);
        let mut mask = Vec::with_capacity(batch * max_len);
        let use_types = self.model.uses_token_types();

        for encoding in encodings {
            let len = encoding.get_ids().len();
            ids.extend_from_slice(encoding.get_ids());
            if use_types {
                type_ids.extend_from_slice(encoding.get_type_ids());
            } else {
                type_ids.extend(std::iter::repeat_n(0u32, len));
            }
            mask.extend_from_slice(encoding.get_attention_mask());

            let pad = max_len - len;
            ids.extend(std::iter::repeat_n(self.pad_id, pad));
            type_ids.extend(std::iter::repeat_n(0u32, pad));
            mask.extend(std::iter::repeat_n(0u32, pad));
        }

        let input_ids = Tensor::from_vec(ids, (batch, max_len), &self.device)?;
        let token_type_ids = Tensor::from_vec(type_ids, (batch, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask, (batch, max_len), &self.device)?;

        let logits = self
            .model
            .forward(&input_ids, &token_type_ids, &attention_mask)
            .map_err(|e| RerankerError::InferenceFailed {
                reason: e.to_string(),
            })?;

        let logits = logits.flatten_all()?.to_vec1::<f32>()?;
        if logits.len() != batch {
            return Err(RerankerError::InferenceFailed {
                reason: format!("expected {} logits, got {}", batch, logits.len()),
            });
        }

        Ok(logits)
    }
}

fn finite(logit: f32) -> Result<f64, RerankerError> {
    if logit.is_finite() {
        Ok(f64::from(logit))
    } else {
        Err(RerankerError::NonFiniteScore { value: logit })
    }
}
