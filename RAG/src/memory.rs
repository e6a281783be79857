use crate::models::*;
use anyhow::Result;
use std::fmt;
use std::sync::Arc;
use tiktoken_rs::CoreBPE;

pub const DEFAULT_TOKEN_LIMIT: usize = 3000;

/// Conversation history bounded by a token budget.
///
/// Every message is stored, but [`ChatMemoryBuffer::get`] only hands back
/// the most recent messages that fit in the budget. The returned window never
/// starts with an assistant turn.
#[derive(Clone)]
pub struct ChatMemoryBuffer {
    token_limit: usize,
    messages: Vec<ChatMessage>,
    tokenizer: Arc<CoreBPE>,
}

impl ChatMemoryBuffer {
    pub fn new(token_limit: usize) -> Result<Self> {
        Ok(Self {
            token_limit,
            messages: Vec::new(),
            tokenizer: Arc::new(tiktoken_rs::cl100k_base()?),
        })
    }

    pub fn token_limit(&self) -> usize {
        self.token_limit
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        self.tokenizer.encode_with_special_tokens(text).len()
    }

    pub fn put(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Recent history that fits next to `initial_tokens` already spent on the
    /// prompt.
    pub fn get(&self, initial_tokens: usize) -> Result<Vec<ChatMessage>> {
        if initial_tokens > self.token_limit {
            anyhow::bail!(
                "initial token count {} exceeds the memory token limit {}",
                initial_tokens,
                self.token_limit
            );
        }

        let mut budget = self.token_limit - initial_tokens;
        let mut start = self.messages.len();
        for (idx, message) in self.messages.iter().enumerate().rev() {
            let tokens = self.count_tokens(&message.content);
            if tokens > budget {
                break;
            }
            budget -= tokens;
            start = idx;
        }

        while start < self.messages.len() && self.messages[start].role == ChatRole::Assistant {
            start += 1;
        }

        Ok(self.messages[start..].to_vec())
    }
}

impl fmt::Debug for ChatMemoryBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatMemoryBuffer")
            .field("token_limit", &self.token_limit)
            .field("messages", &self.messages.len())
            .finish()
    }
}
