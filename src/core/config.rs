use std::{net::SocketAddr, path::PathBuf, time::Duration};

use tracing::{info, warn};

use crate::{
    core::{
        errors::{AppError, AppResult},
        types::Provider,
    },
    db::default_data_dir,
    security::keyring,
    tax::{
        currency::DEFAULT_CURRENCY_PLACEHOLDER, parser::ParseStrategy,
        reconciler::ProfessionalTaxTable,
    },
};

pub const DEFAULT_FLASH_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_PRO_MODEL: &str = "gemini-2.5-pro";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub flash_model: String,
    pub pro_model: String,
    pub summary_strategy: ParseStrategy,
    pub professional_tax: ProfessionalTaxTable,
    pub currency_placeholder: String,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Defaults for everything except the provider key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            data_dir: PathBuf::from(".taxbuddy"),
            flash_model: DEFAULT_FLASH_MODEL.to_string(),
            pro_model: DEFAULT_PRO_MODEL.to_string(),
            summary_strategy: ParseStrategy::default(),
            professional_tax: ProfessionalTaxTable::default(),
            currency_placeholder: DEFAULT_CURRENCY_PLACEHOLDER.to_string(),
            request_timeout: Duration::from_secs(60),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }

    /// Reads the process environment. Any failure here is fatal at startup.
    pub fn from_env() -> AppResult<Self> {
        let api_key = match env_value("GOOGLE_API_KEY") {
            Some(key) => key,
            None => {
                info!("GOOGLE_API_KEY not set, falling back to the OS keyring");
                keyring::get_provider_key(&Provider::Gemini).map_err(|_| {
                    AppError::Config(
                        "GOOGLE_API_KEY is not set and no Gemini key is stored in the keyring"
                            .to_string(),
                    )
                })?
            }
        };

        let mut config = Self::new(api_key);

        if let Some(raw) = env_value("TAXBUDDY_BIND") {
            config.bind_addr = raw
                .parse()
                .map_err(|err| AppError::Config(format!("TAXBUDDY_BIND `{raw}`: {err}")))?;
        }
        config.data_dir = default_data_dir(env_value("TAXBUDDY_DATA_DIR").map(PathBuf::from))?;
        if let Some(model) = env_value("TAXBUDDY_FLASH_MODEL") {
            config.flash_model = model;
        }
        if let Some(model) = env_value("TAXBUDDY_PRO_MODEL") {
            config.pro_model = model;
        }
        if let Some(raw) = env_value("TAXBUDDY_SUMMARY_STRATEGY") {
            config.summary_strategy = ParseStrategy::from_config(&raw).ok_or_else(|| {
                AppError::Config(format!(
                    "TAXBUDDY_SUMMARY_STRATEGY must be `delimited` or `legacy`, got `{raw}`"
                ))
            })?;
            if config.summary_strategy == ParseStrategy::LegacyBraceMatch {
                warn!("legacy brace-matching summary parser selected; prefer `delimited`");
            }
        }
        if let Some(raw) = env_value("TAXBUDDY_PROFESSIONAL_TAX") {
            config.professional_tax = ProfessionalTaxTable::default().with_overrides(&raw)?;
        }
        if let Ok(placeholder) = std::env::var("TAXBUDDY_CURRENCY_PLACEHOLDER") {
            config.currency_placeholder = placeholder;
        }
        if let Some(secs) = env_number("TAXBUDDY_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(megabytes) = env_number("TAXBUDDY_MAX_UPLOAD_MB")? {
            config.max_upload_bytes = (megabytes.max(1) as usize) * 1024 * 1024;
        }

        Ok(config)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_number(name: &str) -> AppResult<Option<u64>> {
    env_value(name)
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|err| AppError::Config(format!("{name} `{raw}`: {err}")))
        })
        .transpose()
}

pub fn log_directives() -> String {
    let level = match std::env::var("TAXBUDDY_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };
    let mut directives = format!("taxbuddy={level},taxbuddy_lib={level},tower_http={level}");
    if !sqlx_debug_enabled() {
        directives.push_str(",sqlx::query=warn");
    }
    directives
}

fn sqlx_debug_enabled() -> bool {
    matches!(
        std::env::var("TAXBUDDY_SQLX_DEBUG")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "1" | "true" | "yes" | "on"
    )
}
