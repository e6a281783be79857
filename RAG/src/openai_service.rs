use crate::llm::LlmClient;
use crate::models::*;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiService {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
}

impl OpenAiService {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            temperature: 0.1,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn build_request(&self, messages: &[ChatMessage]) -> OpenAiChatRequest {
        OpenAiChatRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiService {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = self.build_request(messages);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow::anyhow!("OpenAI API error ({}): {}", status, error_text));
        }

        let completion: OpenAiChatResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("OpenAI API returned no choices"))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_lowercase_roles() {
        let service = OpenAiService::new("sk-test", DEFAULT_OPENAI_MODEL);
        let request = service.build_request(&[ChatMessage::system("rules"), ChatMessage::user("hi")]);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let service = OpenAiService::new("sk-test", "gpt-4o-mini").with_base_url("http://localhost:8080/v1/");
        assert_eq!(service.base_url, "http://localhost:8080/v1");
        assert_eq!(service.model(), "gpt-4o-mini");
    }

    #[test]
    fn parses_completion_body() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Refunds take 30 days."}}]}"#;
        let response: OpenAiChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("Refunds take 30 days."));
    }
}
