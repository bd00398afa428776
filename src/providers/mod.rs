//! Hosted language-model boundary.
//!
//! Everything that talks to a model goes through [`LanguageModel`], so the
//! extraction, calculation and advisor flows can run against a scripted model
//! in tests.

pub mod gemini;

use async_trait::async_trait;

use crate::core::errors::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Ask the model for a bare JSON document.
    Json,
    FreeText,
}

/// Binary document sent alongside the instruction.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub instruction: String,
    pub attachment: Option<Attachment>,
    pub format: ResponseFormat,
}

impl ModelRequest {
    pub fn text(model: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            instruction: instruction.into(),
            attachment: None,
            format: ResponseFormat::FreeText,
        }
    }

    pub fn json(mut self) -> Self {
        self.format = ResponseFormat::Json;
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the model's text answer. One call, no retries.
    async fn generate(&self, request: ModelRequest) -> AppResult<String>;
}
