use crate::llm::LlmClient;
use crate::memory::ChatMemoryBuffer;
use crate::models::*;
use crate::vector_index::VectorIndex;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub const DEFAULT_SIMILARITY_TOP_K: usize = 2;

/// A stateful conversation bound to one index.
#[async_trait]
pub trait ChatEngine: Send {
    async fn chat(&mut self, message: &str) -> Result<ChatResponse>;
}

/// Creates chat engines over a built index.
pub trait ChatEngineFactory: Send + Sync {
    fn create_engine(
        &self,
        index: VectorIndex,
        memory: ChatMemoryBuffer,
        system_prompt: &str,
    ) -> Result<Box<dyn ChatEngine>>;
}

/// Retrieves context for every message and sends it to the LLM as part of the
/// system prompt, followed by the remembered conversation.
pub struct ContextChatEngine {
    index: VectorIndex,
    memory: ChatMemoryBuffer,
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
    similarity_top_k: usize,
}

impl ContextChatEngine {
    pub fn new(
        index: VectorIndex,
        memory: ChatMemoryBuffer,
        llm: Arc<dyn LlmClient>,
        system_prompt: impl Into<String>,
        similarity_top_k: usize,
    ) -> Self {
        Self {
            index,
            memory,
            llm,
            system_prompt: system_prompt.into(),
            similarity_top_k,
        }
    }

    pub fn memory(&self) -> &ChatMemoryBuffer {
        &self.memory
    }

    fn build_context(&self, chunks: &[ScoredChunk]) -> String {
        let mut context = String::new();

        for scored in chunks {
            context.push_str(&format!(
                "Document: {}\nContent: {}\n\n",
                scored.chunk.filename, scored.chunk.content
            ));
        }

        context
    }

    fn build_system_message(&self, context: &str) -> String {
        format!(
            "{}\n\nContext information is below.\n--------------------\n{}\n--------------------\n",
            self.system_prompt,
            context.trim_end()
        )
    }
}

#[async_trait]
impl ChatEngine for ContextChatEngine {
    async fn chat(&mut self, message: &str) -> Result<ChatResponse> {
        let start_time = std::time::Instant::now();

        let source_chunks = self.index.retrieve(message, self.similarity_top_k);
        let system_message = self.build_system_message(&self.build_context(&source_chunks));

        let initial_tokens = self.memory.count_tokens(&system_message) + self.memory.count_tokens(message);
        let history = self.memory.get(initial_tokens.min(self.memory.token_limit()))?;

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_message));
        messages.extend(history);
        messages.push(ChatMessage::user(message));

        let response = self.llm.complete(&messages).await?;

        self.memory.put(ChatMessage::user(message));
        self.memory.put(ChatMessage::assistant(response.clone()));

        log::info!(
            "Chat turn answered by {} in {} ms using {} chunks",
            self.llm.model(),
            start_time.elapsed().as_millis(),
            source_chunks.len()
        );

        Ok(ChatResponse {
            response,
            source_chunks,
        })
    }
}

pub struct ContextChatEngineFactory {
    llm: Arc<dyn LlmClient>,
    similarity_top_k: usize,
}

impl ContextChatEngineFactory {
    pub fn new(llm: Arc<dyn LlmClient>, similarity_top_k: usize) -> Self {
        Self { llm, similarity_top_k }
    }
}

impl ChatEngineFactory for ContextChatEngineFactory {
    fn create_engine(
        &self,
        index: VectorIndex,
        memory: ChatMemoryBuffer,
        system_prompt: &str,
    ) -> Result<Box<dyn ChatEngine>> {
        if self.similarity_top_k == 0 {
            anyhow::bail!("similarity_top_k must be at least 1");
        }

        log::info!(
            "Creating context chat engine over {} chunks (top_k = {}, memory = {} tokens)",
            index.len(),
            self.similarity_top_k,
            memory.token_limit()
        );

        Ok(Box::new(ContextChatEngine::new(
            index,
            memory,
            self.llm.clone(),
            system_prompt,
            self.similarity_top_k,
        )))
    }
}
