use std::path::PathBuf;

pub const MAX_SEQ_LEN: usize = crate::constants::RERANKER_MAX_SEQ_LEN;

/// Pairs per forward pass; larger batches are split.
pub const DEFAULT_MAX_BATCH: usize = 16;

#[derive(Debug, Clone)]
pub struct RerankerConfig {
    pub model_path: PathBuf,

    pub max_seq_len: usize,

    pub max_batch: usize,
}

impl RerankerConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: model_path.into(),
            max_seq_len: MAX_SEQ_LEN,
            max_batch: DEFAULT_MAX_BATCH,
        }
    }

    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.model_path.as_os_str().is_empty() {
            return Err("model_path cannot be empty".to_string());
        }

        if self.max_seq_len < 8 {
            return Err(format!(
                "max_seq_len must be at least 8, got {}",
                self.max_seq_len
            ));
        }

        if self.max_batch == 0 {
            return Err("max_batch must be at least 1".to_string());
        }

        Ok(())
    }
}
