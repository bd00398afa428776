//! Provider API keys kept in the OS credential store.

use crate::core::{
    errors::{AppError, AppResult},
    types::Provider,
};

const SERVICE: &str = "taxbuddy";

fn account_for_provider(provider: &Provider) -> &'static str {
    match provider {
        Provider::Gemini => "gemini",
    }
}

fn entry(provider: &Provider) -> AppResult<keyring::Entry> {
    keyring::Entry::new(SERVICE, account_for_provider(provider))
        .map_err(|err| AppError::Internal(format!("keyring unavailable: {err}")))
}

pub fn set_provider_key(provider: &Provider, api_key: &str) -> AppResult<()> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(AppError::InvalidInput("api key cannot be empty".to_string()));
    }
    entry(provider)?
        .set_password(api_key)
        .map_err(|err| AppError::Internal(format!("keyring write failed: {err}")))
}

pub fn get_provider_key(provider: &Provider) -> AppResult<String> {
    match entry(provider)?.get_password() {
        Ok(key) => Ok(key),
        Err(keyring::Error::NoEntry) => Err(AppError::NotFound(format!(
            "{} api key in keyring",
            account_for_provider(provider)
        ))),
        Err(err) => Err(AppError::Internal(format!("keyring read failed: {err}"))),
    }
}
