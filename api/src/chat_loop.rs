//! Forwards user messages to the live engine and records the exchange.

use crate::error::AppError;
use crate::session::{SessionState, Speaker};

pub const EXIT_USER_TEXT: &str = "Exit";
pub const GOODBYE_TEXT: &str = "Goodbye! Chat ended.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    /// No engine, or nothing was typed.
    Ignored,
    Answered,
    Ended,
}

pub fn is_exit_command(text: &str) -> bool {
    text.to_lowercase() == "exit"
}

/// A failed call appends nothing, so the transcript only ever holds complete
/// exchanges.
pub async fn submit(state: &mut SessionState, text: &str) -> Result<ChatOutcome, AppError> {
    if text.trim().is_empty() {
        return Ok(ChatOutcome::Ignored);
    }
    if state.engine.is_none() {
        log::debug!("Ignoring chat input while no engine is active");
        return Ok(ChatOutcome::Ignored);
    }

    if is_exit_command(text) {
        state.transcript.push(Speaker::User, EXIT_USER_TEXT);
        state.transcript.push(Speaker::Assistant, GOODBYE_TEXT);
        state.engine = None;
        state.refresh_flags();
        log::info!("Chat ended by user");
        return Ok(ChatOutcome::Ended);
    }

    let Some(engine) = state.engine.as_mut() else {
        return Ok(ChatOutcome::Ignored);
    };

    let response = engine.chat(text).await.map_err(|e| {
        log::warn!("Chat turn failed: {:#}", e);
        AppError::Chat(e)
    })?;

    state.transcript.push(Speaker::User, text);
    state.transcript.push(Speaker::Assistant, response.to_string());
    Ok(ChatOutcome::Answered)
}
