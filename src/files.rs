use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        Multipart, State,
    },
    Json,
};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::UploadMode;
use crate::error::{Result, UploadError};
use crate::metadata::{MetadataRecord, UploadResponse, UploadedFile};
use crate::storage::{self, FileClock};
use crate::AppState;

pub const SUCCESS_MESSAGE: &str = "Files uploaded successfully!";

/// POST /upload
///
/// Stores every `file` part, then writes `metadata.json` describing the
/// submission. The destination is resolved before the body is decoded, so a
/// malformed request in per-submission mode still leaves an empty folder.
pub async fn upload_files(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mode = state.config.mode;

    // Shared mode holds the lock across clear, writes and metadata.
    let _guard = match mode {
        UploadMode::Shared => Some(state.shared_lock.lock().await),
        UploadMode::PerSubmission => None,
    };

    let dest = storage::resolve_destination(&state.config.uploads_dir, mode).await?;
    let mut multipart = multipart?;

    let mut metadata = MetadataRecord::default();
    let mut clock = FileClock::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let Some(original_name) = field.file_name().map(str::to_string) else {
                    tracing::debug!("Ignoring 'file' part without a filename");
                    continue;
                };

                let saved_name = clock.saved_name(&original_name);
                let path = dest.join(&saved_name);
                let size = write_field(&mut field, &path).await?;

                tracing::info!(
                    "Stored {} as {} ({} bytes)",
                    original_name,
                    path.display(),
                    size
                );
                metadata.files.push(UploadedFile {
                    original_name,
                    saved_name,
                    path: path.display().to_string(),
                });
            }
            "video_title" => metadata.video_title = Some(field.text().await?),
            "theme" => metadata.theme = Some(field.text().await?),
            _ => {}
        }
    }

    metadata.write_to(&dest).await?;

    let folder = match mode {
        UploadMode::PerSubmission => Some(dest.display().to_string()),
        UploadMode::Shared => None,
    };

    Ok(Json(UploadResponse {
        message: SUCCESS_MESSAGE.to_string(),
        metadata,
        folder,
    }))
}

async fn write_field(field: &mut Field<'_>, path: &Path) -> Result<u64> {
    let mut file = File::create(path)
        .await
        .map_err(|e| UploadError::fs("create file", path, e))?;

    let mut size = 0u64;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(|e| UploadError::fs("write file", path, e))?;
        size += chunk.len() as u64;
    }
    file.flush()
        .await
        .map_err(|e| UploadError::fs("write file", path, e))?;

    Ok(size)
}
