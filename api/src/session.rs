//! Per-browser-session state and the store that hands it out.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Bytes;
use doc_rag::{ChatEngine, Document};
use serde::Serialize;
use uuid::Uuid;

/// Identity of one upload. Every upload gets a fresh id, so re-uploading the
/// same bytes still counts as a new file.
pub type UploadId = Uuid;

#[derive(Clone)]
pub struct UploadedFile {
    pub id: UploadId,
    pub name: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Debug, Default, Clone)]
pub struct ChatTranscript {
    entries: Vec<TranscriptEntry>,
}

impl ChatTranscript {
    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            speaker,
            text: text.into(),
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UiFlags {
    pub initialize_enabled: bool,
    pub chat_active: bool,
}

/// Everything one browser session knows. Passed by `&mut` through a render
/// pass; nothing else holds on to it.
#[derive(Default)]
pub struct SessionState {
    /// Current value of the file-input widget.
    pub file_input: Option<UploadedFile>,
    /// Identity seen by the previous pass.
    pub previous_file: Option<UploadId>,
    pub documents: Option<Arc<Vec<Document>>>,
    pub engine: Option<Box<dyn ChatEngine>>,
    pub transcript: ChatTranscript,
    pub flags: UiFlags,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops everything derived from the current file.
    pub fn reset(&mut self) {
        self.documents = None;
        self.engine = None;
        self.transcript.clear();
        self.refresh_flags();
    }

    pub fn refresh_flags(&mut self) {
        self.flags = UiFlags {
            initialize_enabled: self.file_input.is_some(),
            chat_active: self.engine.is_some(),
        };
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("file_input", &self.file_input)
            .field("previous_file", &self.previous_file)
            .field("documents", &self.documents.as_ref().map(|d| d.len()))
            .field("engine", &self.engine.is_some())
            .field("transcript", &self.transcript.len())
            .field("flags", &self.flags)
            .finish()
    }
}

pub type SharedSession = Arc<tokio::sync::Mutex<SessionState>>;

struct SessionSlot {
    state: SharedSession,
    last_seen: Instant,
}

/// Sessions keyed by the cookie id. Each session sits behind its own async
/// mutex, so at most one pass runs per session at a time.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionSlot>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Returns the session for `id`, or a fresh one under a new id when `id`
    /// is absent or unknown.
    pub fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, SharedSession) {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());

        self.sweep_idle(&mut sessions, now);

        if let Some(id) = id {
            if let Some(slot) = sessions.get_mut(&id) {
                slot.last_seen = now;
                return (id, slot.state.clone());
            }
        }

        let id = Uuid::new_v4();
        let state: SharedSession = Arc::new(tokio::sync::Mutex::new(SessionState::new()));
        sessions.insert(
            id,
            SessionSlot {
                state: state.clone(),
                last_seen: now,
            },
        );
        log::info!("Started session {}", id);
        (id, state)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Sessions still referenced by an in-flight pass are kept.
    fn sweep_idle(&self, sessions: &mut HashMap<Uuid, SessionSlot>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, slot| {
            now.duration_since(slot.last_seen) < self.idle_ttl || Arc::strong_count(&slot.state) > 1
        });

        let removed = before - sessions.len();
        if removed > 0 {
            log::info!("Expired {} idle sessions", removed);
        }
    }
}
