//! Builds the index and chat engine when the user asks for it.

use std::sync::Arc;

use doc_rag::{ChatEngine, ChatMemoryBuffer, Document};

use crate::error::AppError;
use crate::services::Services;
use crate::session::SessionState;

pub const INITIALIZED_NOTICE: &str = "Chat engine initialized successfully!";
pub const INITIALIZE_FAILED_HINT: &str = "Failed to load chat engine. Check your data folder or API key.";

/// On failure any previous engine is dropped, so the chat stays inactive
/// until an initialize succeeds.
pub async fn initialize_engine(state: &mut SessionState, services: &Services) -> Result<(), AppError> {
    let result = match state.documents.clone() {
        Some(documents) => build_engine(documents, services).await,
        None => Err(AppError::Initialize(anyhow::anyhow!("no documents have been loaded"))),
    };

    let outcome = match result {
        Ok(engine) => {
            state.engine = Some(engine);
            Ok(())
        }
        Err(err) => {
            state.engine = None;
            Err(err)
        }
    };
    state.refresh_flags();
    outcome
}

async fn build_engine(
    documents: Arc<Vec<Document>>,
    services: &Services,
) -> Result<Box<dyn ChatEngine>, AppError> {
    let index_builder = services.index_builder.clone();
    let engine_factory = services.engine_factory.clone();
    let token_limit = services.memory_token_limit;
    let system_prompt = services.system_prompt.clone();

    tokio::task::spawn_blocking(move || -> anyhow::Result<Box<dyn ChatEngine>> {
        log::info!("Indexing {} documents", documents.len());
        let index = index_builder.build_index(&documents)?;
        let memory = ChatMemoryBuffer::new(token_limit)?;
        engine_factory.create_engine(index, memory, &system_prompt)
    })
    .await
    .map_err(|e| AppError::Initialize(anyhow::anyhow!("indexing task failed: {}", e)))?
    .map_err(|e| {
        log::warn!("Chat engine initialization failed: {:#}", e);
        AppError::Initialize(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::SYSTEM_PROMPT;
    use crate::session::UploadedFile;
    use crate::testing::{fakes, FakeReader, ScriptedFactory};
    use doc_rag::Document;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn loaded_state() -> SessionState {
        let mut state = SessionState::new();
        state.file_input = Some(UploadedFile::new("doc.pdf", &b"x"[..]));
        state.documents = Some(Arc::new(vec![Document {
            id: "doc".to_string(),
            filename: "doc.pdf".to_string(),
            content: "Refunds are issued within 30 days.".to_string(),
            metadata: BTreeMap::new(),
        }]));
        state
    }

    #[tokio::test]
    async fn creates_engine_with_support_prompt_and_memory_bound() {
        let fakes = fakes(FakeReader::default(), ScriptedFactory::default());
        let mut state = loaded_state();

        initialize_engine(&mut state, &fakes.services).await.unwrap();

        assert!(state.engine.is_some());
        assert!(state.flags.chat_active);
        assert!(state.transcript.is_empty());
        let prompts = fakes.factory.prompts.lock().unwrap();
        assert_eq!(prompts.as_slice(), &[(SYSTEM_PROMPT.to_string(), 3000)]);
    }

    #[tokio::test]
    async fn factory_failure_leaves_engine_unset() {
        let fakes = fakes(
            FakeReader::default(),
            ScriptedFactory {
                fail: true,
                ..Default::default()
            },
        );
        let mut state = loaded_state();

        let err = initialize_engine(&mut state, &fakes.services).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to initialize chat engine: invalid API key");
        assert!(state.engine.is_none());
    }

    #[tokio::test]
    async fn requires_loaded_documents() {
        let fakes = fakes(FakeReader::default(), ScriptedFactory::default());
        let mut state = SessionState::new();

        let err = initialize_engine(&mut state, &fakes.services).await.unwrap_err();

        assert!(matches!(err, AppError::Initialize(_)));
        assert!(state.engine.is_none());
    }

    #[tokio::test]
    async fn failed_reinitialize_drops_the_running_engine() {
        let mut fakes = fakes(FakeReader::default(), ScriptedFactory::default());
        let mut state = loaded_state();
        initialize_engine(&mut state, &fakes.services).await.unwrap();
        assert!(state.flags.chat_active);

        fakes.services.engine_factory = Arc::new(ScriptedFactory {
            fail: true,
            ..Default::default()
        });
        assert!(initialize_engine(&mut state, &fakes.services).await.is_err());

        assert!(state.engine.is_none());
        assert!(!state.flags.chat_active);
    }
}
