//! The collaborators a render pass calls into.

use std::sync::Arc;

use doc_rag::{
    ChatEngineFactory, ContextChatEngineFactory, DocumentReader, GeminiService, IndexBuilder,
    LlmClient, OpenAiService, SimpleDirectoryReader, TfIdfIndexBuilder,
};

use crate::config::{AppConfig, ConfigError, LlmProvider};

pub const SYSTEM_PROMPT: &str = "You are a helpful and knowledgeable support agent. \
Your goal is to assist users with their inquiries, \
provide accurate information, and resolve issues in a friendly and professional manner.";

pub struct Services {
    pub reader: Arc<dyn DocumentReader>,
    pub index_builder: Arc<dyn IndexBuilder>,
    pub engine_factory: Arc<dyn ChatEngineFactory>,
    pub memory_token_limit: usize,
    pub system_prompt: String,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let llm: Arc<dyn LlmClient> = match config.llm.provider {
            LlmProvider::OpenAi => {
                let mut service = OpenAiService::new(config.llm.api_key.clone(), config.llm.model.clone());
                if let Some(base_url) = &config.llm.base_url {
                    service = service.with_base_url(base_url.clone());
                }
                Arc::new(service)
            }
            LlmProvider::Gemini => Arc::new(GeminiService::new(
                config.llm.api_key.clone(),
                config.llm.model.clone(),
            )),
        };

        log::info!(
            "Using {:?} model {} (top_k = {}, memory = {} tokens)",
            config.llm.provider,
            llm.model(),
            config.similarity_top_k,
            config.memory_token_limit
        );

        let index_builder = TfIdfIndexBuilder::new(config.chunk_size, config.chunk_overlap).map_err(|e| {
            ConfigError::Invalid {
                key: "CHUNK_SIZE",
                value: config.chunk_size.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            reader: Arc::new(SimpleDirectoryReader::new()),
            index_builder: Arc::new(index_builder),
            engine_factory: Arc::new(ContextChatEngineFactory::new(llm, config.similarity_top_k)),
            memory_token_limit: config.memory_token_limit,
            system_prompt: SYSTEM_PROMPT.to_string(),
        })
    }
}
