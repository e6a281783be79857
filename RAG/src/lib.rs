//! Document parsing, TF-IDF retrieval and context-grounded chat for the PDF
//! chat UI.

pub mod models;
pub mod document_processor;
pub mod embedding_service;
pub mod vector_index;
pub mod memory;
pub mod llm;
pub mod gemini_service;
pub mod openai_service;
pub mod chat_engine;

pub use models::*;
pub use document_processor::{DocumentReader, SimpleDirectoryReader, TextSplitter};
pub use embedding_service::EmbeddingService;
pub use vector_index::{IndexBuilder, TfIdfIndexBuilder, VectorIndex};
pub use memory::{ChatMemoryBuffer, DEFAULT_TOKEN_LIMIT};
pub use llm::LlmClient;
pub use gemini_service::GeminiService;
pub use openai_service::OpenAiService;
pub use chat_engine::{ChatEngine, ChatEngineFactory, ContextChatEngine, ContextChatEngineFactory};
