//! What one render pass shows, independent of the output format.

use serde::Serialize;

use crate::session::{SessionState, TranscriptEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub level: BannerLevel,
    pub message: String,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    /// Set when startup failed; nothing but the banners is shown.
    pub halted: bool,
    pub banners: Vec<Banner>,
    pub file_name: Option<String>,
    pub documents_loaded: usize,
    pub initialize_enabled: bool,
    pub chat_active: bool,
    pub transcript: Vec<TranscriptEntry>,
}

impl PageView {
    pub fn from_state(state: &SessionState, banners: Vec<Banner>) -> Self {
        Self {
            halted: false,
            banners,
            file_name: state.file_input.as_ref().map(|file| file.name.clone()),
            documents_loaded: state.documents.as_ref().map(|docs| docs.len()).unwrap_or(0),
            initialize_enabled: state.flags.initialize_enabled,
            chat_active: state.flags.chat_active,
            transcript: state.transcript.entries().to_vec(),
        }
    }

    pub fn halted(message: impl Into<String>) -> Self {
        Self {
            halted: true,
            banners: vec![Banner::error(message)],
            file_name: None,
            documents_loaded: 0,
            initialize_enabled: false,
            chat_active: false,
            transcript: Vec::new(),
        }
    }
}
