use serde::ser::SerializeStruct;
use thiserror::Error;

pub const QUOTA_HINT: &str =
    "Switch the calculation model to gemini-2.5-flash to continue, or wait 24 hours.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("provider auth failed")]
    ProviderAuth,
    #[error("provider quota exceeded (429)")]
    ProviderQuotaExceeded { hint: String },
    #[error("provider rate limited")]
    ProviderRateLimited,
    #[error("provider timeout")]
    ProviderTimeout,
    #[error("provider invalid response: {0}")]
    ProviderInvalidResponse(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("could not analyze the document: {0}")]
    ExtractionFormat(String),
    #[error("could not parse final JSON summary: {reason}")]
    SummaryParse { reason: String, raw_response: String },
    #[error("internal error: {0}")]
    Internal(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AppError", 4)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.serialize_field("hint", &self.hint())?;
        state.serialize_field("rawResponse", &self.raw_response())?;
        state.end()
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::ProviderAuth => "PROVIDER_AUTH",
            Self::ProviderQuotaExceeded { .. } => "PROVIDER_QUOTA_EXCEEDED",
            Self::ProviderRateLimited => "PROVIDER_RATE_LIMITED",
            Self::ProviderTimeout => "PROVIDER_TIMEOUT",
            Self::ProviderInvalidResponse(_) => "PROVIDER_INVALID_RESPONSE",
            Self::Network(_) => "NETWORK_ERROR",
            Self::ExtractionFormat(_) => "EXTRACTION_FORMAT",
            Self::SummaryParse { .. } => "SUMMARY_PARSE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Nothing is retried automatically; this only tells the caller whether
    /// repeating the same action by hand has a chance of succeeding.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderRateLimited | Self::ProviderTimeout | Self::Network(_)
        )
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::ProviderQuotaExceeded { hint } => Some(hint.as_str()),
            _ => None,
        }
    }

    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::SummaryParse { raw_response, .. } => Some(raw_response.as_str()),
            _ => None,
        }
    }

    pub fn quota_exceeded() -> Self {
        Self::ProviderQuotaExceeded {
            hint: QUOTA_HINT.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        Self::Database(value.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        Self::Database(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
