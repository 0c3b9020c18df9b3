use std::sync::Arc;

use crate::chatlog::ChatLog;
use crate::extract::ContentExtractor;
use crate::ranking::RankingPipeline;
use crate::tokenizer::TextTokenizer;

/// Shared by every handler. Cloned per request; all fields are cheap handles.
#[derive(Clone)]
pub struct HandlerState {
    pub tokenizer: Arc<dyn TextTokenizer>,

    pub pipeline: Arc<RankingPipeline>,

    pub extractor: Arc<ContentExtractor>,

    pub chatlog: ChatLog,
}

impl HandlerState {
    pub fn new(
        tokenizer: Arc<dyn TextTokenizer>,
        pipeline: RankingPipeline,
        extractor: ContentExtractor,
        chatlog: ChatLog,
    ) -> Self {
        Self {
            tokenizer,
            pipeline: Arc::new(pipeline),
            extractor: Arc::new(extractor),
            chatlog,
        }
    }
}
