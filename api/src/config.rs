//! Environment-driven configuration.
//!
//! Values are read through a lookup function so the binary can use the
//! process environment (after `dotenv`) and tests can pass a map.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use doc_rag::gemini_service::DEFAULT_GEMINI_MODEL;
use doc_rag::openai_service::DEFAULT_OPENAI_MODEL;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MEMORY_TOKEN_LIMIT: usize = 3000;
pub const DEFAULT_SIMILARITY_TOP_K: usize = 2;
pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 60 * 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not found in environment variables. Please set it in your .env file.")]
    MissingCredential(&'static str),
    #[error("unknown LLM_PROVIDER '{0}' (expected 'openai' or 'gemini')")]
    UnknownProvider(String),
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Gemini,
}

impl LlmProvider {
    pub fn credential_key(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "OPENAI_API_KEY",
            LlmProvider::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => DEFAULT_OPENAI_MODEL,
            LlmProvider::Gemini => DEFAULT_GEMINI_MODEL,
        }
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "gemini" => Ok(LlmProvider::Gemini),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
}

// Keeps the credential out of logs.
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub llm: LlmConfig,
    pub memory_token_limit: usize,
    pub similarity_top_k: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub max_upload_bytes: usize,
    pub session_idle_ttl: Duration,
}

impl AppConfig {
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let provider = match non_empty(lookup, "LLM_PROVIDER") {
            Some(value) => value.parse()?,
            None => LlmProvider::OpenAi,
        };

        let api_key = non_empty(lookup, provider.credential_key())
            .ok_or(ConfigError::MissingCredential(provider.credential_key()))?;

        let llm = LlmConfig {
            provider,
            api_key,
            model: non_empty(lookup, "LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            base_url: non_empty(lookup, "OPENAI_BASE_URL"),
        };

        let chunk_size = parse_or(lookup, "CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?;
        let chunk_overlap = parse_or(lookup, "CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?;
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(ConfigError::Invalid {
                key: "CHUNK_OVERLAP",
                value: chunk_overlap.to_string(),
                reason: format!("must be smaller than CHUNK_SIZE ({})", chunk_size),
            });
        }

        let similarity_top_k = parse_or(lookup, "SIMILARITY_TOP_K", DEFAULT_SIMILARITY_TOP_K)?;
        if similarity_top_k == 0 {
            return Err(ConfigError::Invalid {
                key: "SIMILARITY_TOP_K",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            bind_addr: bind_addr(lookup)?,
            llm,
            memory_token_limit: parse_or(lookup, "MEMORY_TOKEN_LIMIT", DEFAULT_MEMORY_TOKEN_LIMIT)?,
            similarity_top_k,
            chunk_size,
            chunk_overlap,
            max_upload_bytes: parse_or(lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            session_idle_ttl: Duration::from_secs(parse_or(
                lookup,
                "SESSION_IDLE_SECS",
                DEFAULT_SESSION_IDLE_SECS,
            )?),
        })
    }
}

/// The listen address is resolved on its own so the server can still come up
/// (and show the configuration error) when the rest of the config is invalid.
pub fn bind_addr(lookup: &dyn Fn(&str) -> Option<String>) -> Result<SocketAddr, ConfigError> {
    let value = non_empty(lookup, "BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
    value.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
        key: "BIND_ADDR",
        value,
        reason: e.to_string(),
    })
}

fn non_empty(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_or<T>(lookup: &dyn Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, key) {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}
