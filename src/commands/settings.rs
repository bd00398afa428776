use tracing::info;

use crate::{
    core::{
        errors::{AppError, AppResult},
        types::{Provider, SetProviderKeyRequest, SetProviderKeyResponse},
    },
    security::keyring,
};

/// Stores the key for the next start; the running client keeps its current key.
pub async fn set_provider_key(request: SetProviderKeyRequest) -> AppResult<SetProviderKeyResponse> {
    if request.api_key.trim().is_empty() {
        return Err(AppError::InvalidInput("api key cannot be empty".to_string()));
    }
    let provider = request.provider.unwrap_or(Provider::Gemini);
    keyring::set_provider_key(&provider, &request.api_key)?;
    info!(?provider, "provider key stored in keyring");
    Ok(SetProviderKeyResponse { stored: true })
}
