//! One render pass: apply the interaction, then run the upload tracker,
//! loader, initializer and chat loop in order against the session.

use crate::chat_loop;
use crate::document_loader;
use crate::engine_init::{self, INITIALIZED_NOTICE, INITIALIZE_FAILED_HINT};
use crate::services::Services;
use crate::session::{SessionState, UploadedFile};
use crate::upload_tracker::track_upload;
use crate::view::{Banner, PageView};

#[derive(Debug)]
pub enum Interaction {
    Refresh,
    SelectFile(UploadedFile),
    RemoveFile,
    Initialize,
    Submit(String),
}

pub async fn render(state: &mut SessionState, interaction: Interaction, services: &Services) -> PageView {
    let mut banners = Vec::new();
    let mut initialize_clicked = false;
    let mut submitted = None;

    match interaction {
        Interaction::Refresh => {}
        Interaction::SelectFile(file) => {
            log::info!("File selected: {} ({} bytes)", file.name, file.bytes.len());
            state.file_input = Some(file);
        }
        Interaction::RemoveFile => state.file_input = None,
        Interaction::Initialize => initialize_clicked = true,
        Interaction::Submit(text) => submitted = Some(text),
    }

    if let Some(notice) = track_upload(state) {
        banners.push(Banner::success(notice));
    }

    match document_loader::ensure_loaded(state, &services.reader).await {
        Ok(Some(name)) => banners.push(Banner::success(format!(
            "File '{}' uploaded and loaded successfully!",
            name
        ))),
        Ok(None) => {}
        Err(err) => banners.push(Banner::error(err.to_string())),
    }

    state.refresh_flags();

    if initialize_clicked {
        if state.flags.initialize_enabled {
            match engine_init::initialize_engine(state, services).await {
                Ok(()) => banners.push(Banner::success(INITIALIZED_NOTICE)),
                Err(err) => {
                    banners.push(Banner::error(err.to_string()));
                    banners.push(Banner::error(INITIALIZE_FAILED_HINT));
                }
            }
        } else {
            log::debug!("Ignoring initialize request without a file");
        }
    }

    if let Some(text) = submitted {
        if let Err(err) = chat_loop::submit(state, &text).await {
            banners.push(Banner::error(err.to_string()));
        }
    }

    state.refresh_flags();
    PageView::from_state(state, banners)
}
