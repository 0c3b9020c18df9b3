//! Tiny random checkpoints for exercising the real scoring path in tests.

use std::path::Path;

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::xlm_roberta::{
    Config as XlmRobertaConfig, XLMRobertaForSequenceClassification,
};
use serde_json::{Map, Value, json};

pub const HIDDEN: usize = 16;

/// Words `w0`..`w{WORDS-1}` are in every fixture vocabulary.
pub const WORDS: usize = 64;

/// Positions available to the BERT fixture; longer pairs fail in the forward pass.
pub const BERT_MAX_POSITIONS: usize = 32;

pub const XLM_ROBERTA_MAX_POSITIONS: usize = 64;

/// `n` space-separated vocabulary words starting at `w{start}`.
pub fn words(start: usize, n: usize) -> String {
    (start..start + n)
        .map(|i| format!("w{}", i % WORDS))
        .collect::<Vec<_>>()
        .join(" ")
}

fn vocab(specials: &[&str]) -> Map<String, Value> {
    let mut vocab = Map::new();
    let tokens = specials
        .iter()
        .map(|s| s.to_string())
        .chain((0..WORDS).map(|i| format!("w{i}")));
    for (id, token) in tokens.enumerate() {
        vocab.insert(token, json!(id));
    }
    vocab
}

fn tokenizer_json(vocab: Map<String, Value>, unk: &str, post_processor: Value) -> Value {
    json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": { "type": "WhitespaceSplit" },
        "post_processor": post_processor,
        "decoder": null,
        "model": { "type": "WordLevel", "vocab": vocab, "unk_token": unk }
    })
}

fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// BertForSequenceClassification layout: `bert.*`, `bert.pooler.dense`, `classifier`.
pub fn write_bert_checkpoint(dir: &Path) {
    let vocab = vocab(&["[PAD]", "[UNK]", "[CLS]", "[SEP]"]);
    let config = json!({
        "vocab_size": vocab.len(),
        "hidden_size": HIDDEN,
        "num_hidden_layers": 2,
        "num_attention_heads": 2,
        "intermediate_size": 32,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.0,
        "max_position_embeddings": BERT_MAX_POSITIONS,
        "type_vocab_size": 2,
        "initializer_range": 0.02,
        "layer_norm_eps": 1e-12,
        "pad_token_id": 0,
        "model_type": "bert"
    });
    let bert_config: BertConfig = serde_json::from_value(config.clone()).unwrap();

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    BertModel::load(vb.pp("bert"), &bert_config).unwrap();
    candle_nn::linear(HIDDEN, HIDDEN, vb.pp("bert.pooler.dense")).unwrap();
    candle_nn::linear(HIDDEN, 1, vb.pp("classifier")).unwrap();
    varmap.save(dir.join("model.safetensors")).unwrap();

    write_json(&dir.join("config.json"), &config);
    write_json(
        &dir.join("tokenizer.json"),
        &tokenizer_json(
            vocab,
            "[UNK]",
            json!({ "type": "BertProcessing", "sep": ["[SEP]", 3], "cls": ["[CLS]", 2] }),
        ),
    );
}

/// XLMRobertaForSequenceClassification layout with `<pad>` = 1, as in the
/// published XLM-R rerankers.
pub fn write_xlm_roberta_checkpoint(dir: &Path) -> XlmRobertaConfig {
    let vocab = vocab(&["<s>", "<pad>", "</s>", "<unk>"]);
    let config = json!({
        "vocab_size": vocab.len(),
        "hidden_size": HIDDEN,
        "num_hidden_layers": 2,
        "num_attention_heads": 2,
        "intermediate_size": 32,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.0,
        "attention_probs_dropout_prob": 0.0,
        "max_position_embeddings": XLM_ROBERTA_MAX_POSITIONS,
        "type_vocab_size": 1,
        "layer_norm_eps": 1e-5,
        "pad_token_id": 1,
        "position_embedding_type": "absolute",
        "model_type": "xlm-roberta"
    });
    let xlm_config: XlmRobertaConfig = serde_json::from_value(config.clone()).unwrap();

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    XLMRobertaForSequenceClassification::new(1, &xlm_config, vb).unwrap();
    varmap.save(dir.join("model.safetensors")).unwrap();

    write_json(&dir.join("config.json"), &config);
    write_json(
        &dir.join("tokenizer.json"),
        &tokenizer_json(
            vocab,
            "<unk>",
            json!({
                "type": "RobertaProcessing",
                "sep": ["</s>", 2],
                "cls": ["<s>", 0],
                "trim_offsets": true,
                "add_prefix_space": false
            }),
        ),
    );

    xlm_config
}
