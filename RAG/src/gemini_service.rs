use crate::llm::LlmClient;
use crate::models::*;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiService {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiService {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// System messages move into `system_instruction`; assistant turns use
    /// Gemini's `model` role.
    pub fn build_request(&self, messages: &[ChatMessage]) -> GeminiRequest {
        let system_text: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == ChatRole::System)
            .map(|m| m.content.as_str())
            .collect();

        let system_instruction = if system_text.is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: system_text.join("\n\n"),
                }],
            })
        };

        let contents = messages
            .iter()
            .filter(|m| m.role != ChatRole::System)
            .map(|m| GeminiContent {
                role: Some(if m.role == ChatRole::Assistant { "model" } else { "user" }.to_string()),
                parts: vec![GeminiPart {
                    text: m.content.clone(),
                }],
            })
            .collect();

        GeminiRequest {
            system_instruction,
            contents,
            generation_config: Some(GeminiGenerationConfig {
                temperature: 0.3,
                max_output_tokens: 1000,
            }),
        }
    }
}

#[async_trait]
impl LlmClient for GeminiService {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = self.build_request(messages);

        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let response = self.client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(api_error(status, &error_text));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        first_candidate_text(gemini_response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn api_error(status: reqwest::StatusCode, body: &str) -> anyhow::Error {
    anyhow::anyhow!("Gemini API error ({}): {}", status, body)
}

/// Blocked prompts come back as a 200 with no candidates.
fn first_candidate_text(response: GeminiResponse) -> Result<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text)
        .ok_or_else(|| anyhow::anyhow!("Gemini API returned no candidates"))
}
