//! BERT / XLM-RoBERTa sequence classifier with a single relevance logit.
//!
//! Handles the three checkpoint layouts we see in the wild:
//! - `bert.*` + `bert.pooler.*` + `classifier` (BertForSequenceClassification)
//! - `roberta.*` + `classifier.dense` + `classifier.out_proj` (XLMRobertaForSequenceClassification)
//! - bare encoder weights + `classifier`
//!
//! XLM-RoBERTa numbers positions from `pad_token_id + 1` and skips pad tokens,
//! so it runs on candle's `xlm_roberta` model rather than `BertModel`.

use candle::{DType, Device, Result, Tensor};
use candle_core as candle;
use candle_core::IndexOp;
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::xlm_roberta::{
    Config as XlmRobertaConfig, XLMRobertaForSequenceClassification,
};
use serde_json::Value;
use std::path::Path;

const XLM_ROBERTA_PREFIX: &str = "roberta.embeddings.word_embeddings.weight";

/// Optional pooler (dense + tanh) followed by a single linear layer.
struct LinearHead {
    pooler: Option<Linear>,
    classifier: Linear,
}

impl LinearHead {
    fn forward(&self, cls: &Tensor) -> Result<Tensor> {
        match &self.pooler {
            Some(pooler) => self.classifier.forward(&pooler.forward(cls)?.tanh()?),
            None => self.classifier.forward(cls),
        }
    }
}

enum Backbone {
    Bert { encoder: BertModel, head: LinearHead },
    XlmRoberta(XLMRobertaForSequenceClassification),
}

struct SequenceClassifierImpl {
    backbone: Backbone,
    type_vocab_size: usize,
    pad_token_id: u32,
}

impl SequenceClassifierImpl {
    fn load(vb: VarBuilder, raw_config: Value) -> Result<Self> {
        if is_xlm_roberta(&vb, &raw_config) {
            let config = xlm_roberta_config(raw_config)?;
            let model = XLMRobertaForSequenceClassification::new(1, &config, vb)?;
            return Ok(Self {
                backbone: Backbone::XlmRoberta(model),
                type_vocab_size: config.type_vocab_size,
                pad_token_id: config.pad_token_id,
            });
        }

        let config: BertConfig = serde_json::from_value(raw_config)
            .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))?;
        let hidden_size = config.hidden_size;

        let (encoder, pooler_name) = if vb.contains_tensor("bert.embeddings.word_embeddings.weight")
        {
            (BertModel::load(vb.pp("bert"), &config)?, "bert.pooler.dense")
        } else {
            (BertModel::load(vb.clone(), &config)?, "pooler.dense")
        };

        let pooler = if vb.contains_tensor(&format!("{pooler_name}.weight")) {
            Some(candle_nn::linear(
                hidden_size,
                hidden_size,
                vb.pp(pooler_name),
            )?)
        } else {
            None
        };
        let head = LinearHead {
            pooler,
            classifier: candle_nn::linear(hidden_size, 1, vb.pp("classifier"))?,
        };

        Ok(Self {
            backbone: Backbone::Bert { encoder, head },
            type_vocab_size: config.type_vocab_size,
            pad_token_id: config.pad_token_id as u32,
        })
    }

    fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        match &self.backbone {
            Backbone::Bert { encoder, head } => {
                let output = encoder.forward(input_ids, token_type_ids, Some(attention_mask))?;
                let cls_token = output.i((.., 0, ..))?;
                head.forward(&cls_token)
            }
            Backbone::XlmRoberta(model) => {
                model.forward(input_ids, attention_mask, token_type_ids)
            }
        }
    }
}

fn is_xlm_roberta(vb: &VarBuilder, raw_config: &Value) -> bool {
    let model_type = raw_config
        .get("model_type")
        .and_then(Value::as_str)
        .unwrap_or_default();
    matches!(model_type, "xlm-roberta" | "roberta") || vb.contains_tensor(XLM_ROBERTA_PREFIX)
}

/// Older exports omit `position_embedding_type`; absolute is the only kind supported.
fn xlm_roberta_config(mut raw_config: Value) -> Result<XlmRobertaConfig> {
    if let Some(map) = raw_config.as_object_mut() {
        map.entry("position_embedding_type")
            .or_insert_with(|| Value::String("absolute".to_string()));
    }
    serde_json::from_value(raw_config)
        .map_err(|e| candle::Error::Msg(format!("Failed to parse XLM-RoBERTa config: {}", e)))
}

/// Cheaply clonable handle to a loaded cross-encoder.
#[derive(Clone)]
pub struct SequenceClassifier(std::sync::Arc<SequenceClassifierImpl>);

impl SequenceClassifier {
    /// Loads `config.json` + `model.safetensors` from `model_dir`.
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config_path = model_dir.join("config.json");
        let weights_path = model_dir.join("model.safetensors");

        let config_content = std::fs::read_to_string(config_path)?;
        let raw_config: Value = serde_json::from_str(&config_content)
            .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))?;

        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? };

        let model = SequenceClassifierImpl::load(vb, raw_config)?;

        Ok(Self(std::sync::Arc::new(model)))
    }

    /// Segment ids are only meaningful when the checkpoint has more than one segment embedding.
    pub fn uses_token_types(&self) -> bool {
        self.0.type_vocab_size > 1
    }

    /// Id the checkpoint treats as padding.
    pub fn pad_token_id(&self) -> u32 {
        self.0.pad_token_id
    }

    pub fn is_xlm_roberta(&self) -> bool {
        matches!(self.0.backbone, Backbone::XlmRoberta(_))
    }

    /// Returns logits shaped `[batch, 1]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        self.0.forward(input_ids, token_type_ids, attention_mask)
    }
}
