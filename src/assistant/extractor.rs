//! Turns one uploaded document into an [`ExtractedDocument`] via the model.

use std::path::Path;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::{
    assistant::prompts,
    core::errors::{AppError, AppResult},
    providers::{Attachment, LanguageModel, ModelRequest},
    tax::document::ExtractedDocument,
};

pub const SUPPORTED_MEDIA_TYPES: [&str; 3] = ["application/pdf", "image/jpeg", "image/png"];

pub fn checksum_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Uses the declared type when it is supported, else infers from the extension.
pub fn resolve_media_type(file_name: &str, declared: Option<&str>) -> AppResult<String> {
    let declared = declared
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty());
    if let Some(declared) = &declared {
        if SUPPORTED_MEDIA_TYPES.contains(&declared.as_str()) {
            return Ok(declared.clone());
        }
        if declared == "image/jpg" {
            return Ok("image/jpeg".to_string());
        }
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => Ok("application/pdf".to_string()),
        Some("jpg") | Some("jpeg") => Ok("image/jpeg".to_string()),
        Some("png") => Ok("image/png".to_string()),
        _ => Err(AppError::InvalidInput(format!(
            "unsupported file type for `{file_name}` (declared {}); upload a PDF, JPG or PNG",
            declared.as_deref().unwrap_or("nothing")
        ))),
    }
}

/// Removes one surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

pub fn parse_extraction(response: &str) -> AppResult<ExtractedDocument> {
    let candidate = strip_code_fence(response);
    let value: Value = serde_json::from_str(candidate).map_err(|err| {
        AppError::ExtractionFormat(format!(
            "response is not valid JSON: {err}: {}",
            candidate.chars().take(200).collect::<String>()
        ))
    })?;
    if !value.is_object() {
        return Err(AppError::ExtractionFormat(
            "response is not a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|err| AppError::ExtractionFormat(format!("unexpected document shape: {err}")))
}

pub async fn extract_document(
    model: &dyn LanguageModel,
    model_name: &str,
    media_type: &str,
    bytes: Vec<u8>,
) -> AppResult<ExtractedDocument> {
    let request = ModelRequest::text(model_name, prompts::extraction_prompt())
        .json()
        .with_attachment(Attachment {
            mime_type: media_type.to_string(),
            data: bytes,
        });
    let response = model.generate(request).await?;
    let document = parse_extraction(&response).inspect_err(|err| {
        warn!(error = %err, "extraction response could not be read");
    })?;
    info!(
        income_sources = document.income_sources().count(),
        deductions = document.deduction_entries().len(),
        "document extracted"
    );
    Ok(document)
}
