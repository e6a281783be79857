//! Bridges an in-memory upload to the directory reader through a scoped
//! temporary directory.

use std::path::Path;
use std::sync::Arc;

use doc_rag::{Document, DocumentReader};

use crate::error::AppError;
use crate::session::{SessionState, UploadedFile};

const FALLBACK_FILENAME: &str = "upload.pdf";

/// Loads the selected file when nothing has been parsed for it yet.
///
/// Returns the file name on a fresh load and `None` when there was nothing to
/// do. On failure `documents` stays unset, so the next pass retries.
pub async fn ensure_loaded(
    state: &mut SessionState,
    reader: &Arc<dyn DocumentReader>,
) -> Result<Option<String>, AppError> {
    if state.documents.is_some() {
        return Ok(None);
    }
    let Some(file) = state.file_input.as_ref() else {
        return Ok(None);
    };

    let name = file.name.clone();
    let documents = load_upload(reader.clone(), file).await?;

    log::info!("Loaded {} documents from {}", documents.len(), name);
    state.documents = Some(Arc::new(documents));
    Ok(Some(name))
}

pub async fn load_upload(
    reader: Arc<dyn DocumentReader>,
    file: &UploadedFile,
) -> Result<Vec<Document>, AppError> {
    let filename = sanitize_filename(&file.name);
    let bytes = file.bytes.clone();

    tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<Document>> {
        // Removed when dropped, on every return path.
        let temp_dir = tempfile::tempdir()?;
        write_and_read(reader.as_ref(), temp_dir.path(), &filename, &bytes)
    })
    .await
    .map_err(|e| AppError::Load(anyhow::anyhow!("document loader task failed: {}", e)))?
    .map_err(|e| {
        log::warn!("Failed to load {}: {:#}", file.name, e);
        AppError::Load(e)
    })
}

fn write_and_read(
    reader: &dyn DocumentReader,
    dir: &Path,
    filename: &str,
    bytes: &[u8],
) -> anyhow::Result<Vec<Document>> {
    std::fs::write(dir.join(filename), bytes)?;
    reader.load_data(dir)
}

/// Keeps only the last path component of a client-supplied name.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or("")
        .trim();

    if base.is_empty() || base == "." || base == ".." {
        FALLBACK_FILENAME.to_string()
    } else {
        base.to_string()
    }
}
