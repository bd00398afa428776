pub mod api;
pub mod assistant;
pub mod commands;
pub mod core;
pub mod db;
pub mod providers;
pub mod security;
pub mod tax;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    assistant::session::SessionStore,
    core::{config::AppConfig, errors::AppResult},
    db::Database,
    providers::{gemini::GeminiClient, LanguageModel},
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub model: Arc<dyn LanguageModel>,
    pub config: Arc<AppConfig>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(db: Database, model: Arc<dyn LanguageModel>, config: AppConfig) -> Self {
        Self {
            db,
            model,
            config: Arc::new(config),
            sessions: SessionStore::new(),
        }
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(crate::core::config::log_directives()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Loads configuration, opens the store and serves the API until shutdown.
/// Configuration errors surface here before anything is bound.
pub async fn run() -> AppResult<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    info!(
        data_dir = %config.data_dir.display(),
        flash_model = %config.flash_model,
        pro_model = %config.pro_model,
        summary_strategy = config.summary_strategy.as_str(),
        "configuration loaded"
    );

    let db = Database::new(&config.data_dir).await?;
    let gemini = GeminiClient::new(config.api_key.clone(), config.request_timeout)?;
    let bind_addr = config.bind_addr;
    let state = AppState::new(db, Arc::new(gemini), config);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("listening on http://{bind_addr}");
    axum::serve(listener, api::router(state)).await?;
    Ok(())
}
