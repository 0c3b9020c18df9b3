use std::collections::HashMap;

use parking_lot::RwLock;

use super::{TextTokenizer, TokenizerError};

/// Whitespace tokenizer with a vocabulary that grows on demand.
///
/// One token per whitespace-separated word; decoding joins words with a single
/// space. Deterministic for a given sequence of inputs.
#[derive(Default)]
pub struct MockTokenizer {
    vocab: RwLock<Vocab>,
    poison_word: Option<String>,
}

#[derive(Default)]
struct Vocab {
    ids: HashMap<String, u32>,
    words: Vec<String>,
}

impl MockTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `encode` fail for any text containing `word`.
    pub fn failing_on(word: impl Into<String>) -> Self {
        Self {
            poison_word: Some(word.into()),
            ..Default::default()
        }
    }

    fn intern(&self, word: &str) -> u32 {
        if let Some(id) = self.vocab.read().ids.get(word) {
            return *id;
        }
        let mut vocab = self.vocab.write();
        if let Some(id) = vocab.ids.get(word) {
            return *id;
        }
        let id = vocab.words.len() as u32;
        vocab.words.push(word.to_string());
        vocab.ids.insert(word.to_string(), id);
        id
    }
}

impl TextTokenizer for MockTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        if let Some(ref poison) = self.poison_word
            && text.contains(poison.as_str())
        {
            return Err(TokenizerError::EncodeFailed {
                reason: format!("mock tokenizer refuses '{poison}'"),
            });
        }
        Ok(text.split_whitespace().map(|w| self.intern(w)).collect())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, TokenizerError> {
        let vocab = self.vocab.read();
        ids.iter()
            .map(|id| {
                vocab
                    .words
                    .get(*id as usize)
                    .map(String::as_str)
                    .ok_or_else(|| TokenizerError::DecodeFailed {
                        reason: format!("unknown token id {id}"),
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|words| words.join(" "))
    }
}
