//! Document upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{UploadResponse, UploadedFile};

/// Multipart field carrying the files
const FILES_FIELD: &str = "files";

/// POST /upload - Load, chunk, embed, and store uploaded files
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::BadRequest(format!("Failed to read {}: {}", filename, e)))?;

        tracing::info!("File {}: {} ({} bytes)", files.len() + 1, filename, data.len());
        files.push(UploadedFile::new(filename, data));
    }

    if files.is_empty() {
        return Err(Error::BadRequest(format!(
            "No files provided in '{}' field",
            FILES_FIELD
        )));
    }

    tracing::info!("Upload request received with {} files", files.len());

    let pipeline = state.ingestion()?;
    let report = pipeline.run_pipeline(files).await;

    tracing::info!(
        "Upload processed: {} documents, {} chunks stored, {} skipped",
        report.documents_loaded,
        report.ids.len(),
        report.skipped.len()
    );

    Ok(Json(UploadResponse {
        message: "Files uploaded successfully".to_string(),
        documents_loaded: report.documents_loaded,
        chunks_stored: report.ids.len(),
        skipped: report.skipped,
    }))
}
