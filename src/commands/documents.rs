use tracing::info;

use crate::{
    assistant::{
        extractor::{checksum_bytes, extract_document, resolve_media_type},
        session::UploadedFile,
    },
    core::{
        errors::{AppError, AppResult},
        types::UploadDocumentResponse,
    },
    AppState,
};

/// Analyzes an upload. Re-sending the same file returns the cached extraction;
/// a different file clears everything derived from the previous one.
pub async fn upload_document(
    state: &AppState,
    session_id: &str,
    file_name: &str,
    declared_type: Option<&str>,
    bytes: Vec<u8>,
) -> AppResult<UploadDocumentResponse> {
    let file_name = file_name.trim();
    if file_name.is_empty() {
        return Err(AppError::InvalidInput("file name cannot be empty".to_string()));
    }
    if bytes.is_empty() {
        return Err(AppError::InvalidInput("uploaded file is empty".to_string()));
    }
    if bytes.len() > state.config.max_upload_bytes {
        return Err(AppError::InvalidInput(format!(
            "uploaded file exceeds {} bytes",
            state.config.max_upload_bytes
        )));
    }
    let media_type = resolve_media_type(file_name, declared_type)?;
    let fingerprint = checksum_bytes(&bytes);

    let session = state.sessions.get(session_id).await?;
    let mut session = session.lock().await;

    if session.is_same_upload(&fingerprint) {
        if let Some(document) = session.extracted.clone() {
            info!(session_id, file_name, "same upload, reusing extraction");
            return Ok(UploadDocumentResponse {
                file_name: file_name.to_string(),
                fingerprint,
                cached: true,
                document,
            });
        }
    }

    session.reset_for_upload(UploadedFile {
        name: file_name.to_string(),
        media_type: media_type.clone(),
        fingerprint: fingerprint.clone(),
    });
    info!(session_id, file_name, media_type = %media_type, bytes = bytes.len(), "analyzing document");

    let document = extract_document(
        state.model.as_ref(),
        &state.config.flash_model,
        &media_type,
        bytes,
    )
    .await?;
    session.extracted = Some(document.clone());

    Ok(UploadDocumentResponse {
        file_name: file_name.to_string(),
        fingerprint,
        cached: false,
        document,
    })
}
