use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{
    core::{
        config::AppConfig,
        errors::{AppError, AppResult},
        types::SessionSnapshot,
    },
    tax::{document::ExtractedDocument, summary::TaxSummary},
};

pub const PRO_TIER_WARNING: &str =
    "gemini-2.5-pro has a strict free-tier quota and may fail with a quota error; switch back to gemini-2.5-flash if that happens.";

/// Model used for the calculation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    #[default]
    Flash,
    Pro,
}

impl ModelTier {
    pub fn model_name<'a>(&self, config: &'a AppConfig) -> &'a str {
        match self {
            Self::Flash => &config.flash_model,
            Self::Pro => &config.pro_model,
        }
    }

    pub fn warning(&self) -> Option<&'static str> {
        match self {
            Self::Flash => None,
            Self::Pro => Some(PRO_TIER_WARNING),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Assistant => "ASSISTANT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub media_type: String,
    pub fingerprint: String,
}

/// Everything one user session has produced so far.
///
/// Derived state only ever moves forward: upload, then extraction, then
/// calculation, then chat. A new upload with a different fingerprint resets
/// all of it through [`SessionContext::reset_for_upload`].
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub id: String,
    pub owner: String,
    pub upload: Option<UploadedFile>,
    pub extracted: Option<ExtractedDocument>,
    pub calculation_response: Option<String>,
    pub summary: Option<TaxSummary>,
    pub user_80d: f64,
    pub calculation_tier: ModelTier,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner: owner.into(),
            upload: None,
            extracted: None,
            calculation_response: None,
            summary: None,
            user_80d: 0.0,
            calculation_tier: ModelTier::default(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn reset_for_upload(&mut self, upload: UploadedFile) {
        self.upload = Some(upload);
        self.extracted = None;
        self.calculation_response = None;
        self.summary = None;
        self.user_80d = 0.0;
        self.messages.clear();
    }

    pub fn is_same_upload(&self, fingerprint: &str) -> bool {
        self.upload
            .as_ref()
            .is_some_and(|upload| upload.fingerprint == fingerprint)
    }

    pub fn require_document(&self) -> AppResult<&ExtractedDocument> {
        self.extracted.as_ref().ok_or_else(|| {
            AppError::InvalidInput("upload and analyze a document first".to_string())
        })
    }

    pub fn require_summary(&self) -> AppResult<&TaxSummary> {
        self.summary
            .as_ref()
            .ok_or_else(|| AppError::InvalidInput("calculate your tax first".to_string()))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            owner: self.owner.clone(),
            file_name: self.upload.as_ref().map(|upload| upload.name.clone()),
            extracted: self.extracted.clone(),
            calculation_response: self.calculation_response.clone(),
            summary: self.summary.clone(),
            user80d: self.user_80d,
            calculation_tier: self.calculation_tier,
            messages: self.messages.clone(),
            created_at: self.created_at,
        }
    }
}

pub type SharedSession = Arc<Mutex<SessionContext>>;

/// In-process registry of live sessions. Sessions are not persisted.
#[derive(Debug, Default, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SharedSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, owner: &str) -> AppResult<SessionContext> {
        let owner = owner.trim();
        if owner.is_empty() {
            return Err(AppError::InvalidInput("owner cannot be empty".to_string()));
        }
        let session = SessionContext::new(owner);
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), Arc::new(Mutex::new(session.clone())));
        Ok(session)
    }

    pub async fn get(&self, id: &str) -> AppResult<SharedSession> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("session {id}")))
    }

    /// Drops the session and everything derived in it. Stored records stay.
    pub async fn remove(&self, id: &str) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("session {id}")))
    }
}
