//! Detects when the selected file changes and resets what was built from it.

use crate::session::SessionState;

pub const RESET_NOTICE: &str = "Previous file removed. Chat engine and history reset.";

/// Compares the file input with the identity recorded by the last pass.
///
/// Replacing a file and removing it take the same path: if a file was
/// present before, all derived state is reset and a notice is returned.
pub fn track_upload(state: &mut SessionState) -> Option<&'static str> {
    let current = state.file_input.as_ref().map(|file| file.id);
    if current == state.previous_file {
        return None;
    }

    let had_file = state.previous_file.is_some();
    state.previous_file = current;

    if had_file {
        log::info!("Selected file changed, resetting documents, engine and transcript");
        state.reset();
        Some(RESET_NOTICE)
    } else {
        state.refresh_flags();
        None
    }
}
