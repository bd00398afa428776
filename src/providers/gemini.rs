use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    core::errors::{AppError, AppResult},
    providers::{LanguageModel, ModelRequest, ResponseFormat},
};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Network(err.to_string()))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
        })
    }

    fn payload(request: &ModelRequest) -> Value {
        let mut parts = vec![serde_json::json!({ "text": request.instruction })];
        if let Some(attachment) = &request.attachment {
            parts.push(serde_json::json!({
                "inline_data": {
                    "mime_type": attachment.mime_type,
                    "data": BASE64.encode(&attachment.data),
                }
            }));
        }

        let mut generation_config = serde_json::Map::new();
        if request.format == ResponseFormat::Json {
            generation_config.insert(
                "responseMimeType".to_string(),
                Value::String("application/json".to_string()),
            );
        }

        serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": parts
                }
            ],
            "generationConfig": generation_config
        })
    }
}

/// Maps a non-success status to the error taxonomy. A 429 whose body mentions
/// a quota is the distinguished quota error; other 429s are plain rate limits.
pub fn classify_status(status: StatusCode, body: &str) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::ProviderAuth,
        StatusCode::TOO_MANY_REQUESTS if body.to_ascii_lowercase().contains("quota") => {
            AppError::quota_exceeded()
        }
        StatusCode::TOO_MANY_REQUESTS => AppError::ProviderRateLimited,
        status => AppError::ProviderInvalidResponse(format!("status {status} body {body}")),
    }
}

/// Concatenated text of the first candidate.
pub fn candidate_text(body: &Value) -> AppResult<String> {
    if let Some(reason) = body
        .get("promptFeedback")
        .and_then(|feedback| feedback.get("blockReason"))
        .and_then(Value::as_str)
    {
        return Err(AppError::ProviderInvalidResponse(format!(
            "prompt blocked: {reason}"
        )));
    }

    let parts = body
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|item| item.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::ProviderInvalidResponse("missing text candidate".to_string()))?;

    let text = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<String>();
    Ok(text)
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, request: ModelRequest) -> AppResult<String> {
        let endpoint = format!(
            "{GEMINI_BASE_URL}/models/{}:generateContent?key={}",
            request.model, self.api_key
        );
        debug!(
            model = %request.model,
            instruction_len = request.instruction.len(),
            attachment_bytes = request.attachment.as_ref().map(|a| a.data.len()).unwrap_or(0),
            json = request.format == ResponseFormat::Json,
            "sending gemini request"
        );

        let response = self
            .http
            .post(endpoint)
            .json(&Self::payload(&request))
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    AppError::ProviderTimeout
                } else {
                    AppError::Network(err.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_status(status, &body);
            warn!(model = %request.model, code = err.code(), "gemini request failed");
            return Err(err);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))?;
        let text = candidate_text(&body)?;
        debug!(model = %request.model, response_len = text.len(), "gemini response received");
        Ok(text)
    }
}
