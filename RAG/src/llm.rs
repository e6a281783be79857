use crate::models::ChatMessage;
use anyhow::Result;
use async_trait::async_trait;

/// A chat-completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    fn model(&self) -> &str;
}
