//! In-process fakes for the collaborators.

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use doc_rag::{
    ChatEngine, ChatEngineFactory, ChatMemoryBuffer, ChatResponse, Document, DocumentReader,
    TfIdfIndexBuilder, VectorIndex,
};

use crate::services::{Services, SYSTEM_PROMPT};

/// Reads whatever files the loader wrote as lossy UTF-8, remembering the
/// directory it was pointed at.
#[derive(Default)]
pub struct FakeReader {
    pub fail: bool,
    pub seen_dirs: Mutex<Vec<PathBuf>>,
}

impl DocumentReader for FakeReader {
    fn load_data(&self, dir: &Path) -> anyhow::Result<Vec<Document>> {
        self.seen_dirs.lock().unwrap().push(dir.to_path_buf());
        if self.fail {
            anyhow::bail!("unsupported file");
        }

        let mut documents = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let filename = path.file_name().unwrap().to_string_lossy().to_string();
            documents.push(Document {
                id: filename.clone(),
                filename,
                content: String::from_utf8_lossy(&std::fs::read(&path)?).to_string(),
                metadata: BTreeMap::new(),
            });
        }
        Ok(documents)
    }
}

/// Replies are taken from `script` in order; once it runs dry the engine
/// echoes the message.
#[derive(Clone, Default)]
pub struct Script(pub Arc<Mutex<VecDeque<Result<String, String>>>>);

impl Script {
    pub fn push_ok(&self, reply: &str) {
        self.0.lock().unwrap().push_back(Ok(reply.to_string()));
    }

    pub fn push_err(&self, reason: &str) {
        self.0.lock().unwrap().push_back(Err(reason.to_string()));
    }
}

pub struct ScriptedEngine {
    script: Script,
}

#[async_trait]
impl ChatEngine for ScriptedEngine {
    async fn chat(&mut self, message: &str) -> anyhow::Result<ChatResponse> {
        let next = self.script.0.lock().unwrap().pop_front();
        match next {
            Some(Ok(response)) => Ok(ChatResponse {
                response,
                source_chunks: Vec::new(),
            }),
            Some(Err(reason)) => Err(anyhow::anyhow!(reason)),
            None => Ok(ChatResponse {
                response: format!("echo: {}", message),
                source_chunks: Vec::new(),
            }),
        }
    }
}

#[derive(Default)]
pub struct ScriptedFactory {
    pub fail: bool,
    pub script: Script,
    pub prompts: Mutex<Vec<(String, usize)>>,
}

impl ChatEngineFactory for ScriptedFactory {
    fn create_engine(
        &self,
        _index: VectorIndex,
        memory: ChatMemoryBuffer,
        system_prompt: &str,
    ) -> anyhow::Result<Box<dyn ChatEngine>> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), memory.token_limit()));
        if self.fail {
            anyhow::bail!("invalid API key");
        }
        Ok(Box::new(ScriptedEngine {
            script: self.script.clone(),
        }))
    }
}

pub struct Fakes {
    pub reader: Arc<FakeReader>,
    pub factory: Arc<ScriptedFactory>,
    pub services: Services,
}

pub fn fakes(reader: FakeReader, factory: ScriptedFactory) -> Fakes {
    let reader = Arc::new(reader);
    let factory = Arc::new(factory);

    let services = Services {
        reader: reader.clone(),
        index_builder: Arc::new(TfIdfIndexBuilder::new(500, 50).unwrap()),
        engine_factory: factory.clone(),
        memory_token_limit: 3000,
        system_prompt: SYSTEM_PROMPT.to_string(),
    };

    Fakes {
        reader,
        factory,
        services,
    }
}
