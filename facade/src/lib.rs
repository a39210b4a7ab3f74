//! Token-gated HTTP facade over a trading bot's command interface and its
//! order, settings and prompt files.

pub mod commands;
pub mod config;
pub mod env_codec;
pub mod error;
pub mod files;
pub mod middleware;
pub mod orders;
pub mod prompts;
pub mod routes;
pub mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;

use crate::commands::{BotSettings, CommandHandler, Dispatcher};
use crate::config::FacadeConfig;
use crate::prompts::PromptStore;
use crate::settings::SettingsStore;

/// Shared application state passed to all route handlers via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    pub auth_token: String,
    pub dispatcher: Dispatcher,
    pub settings: SettingsStore,
    pub prompts: PromptStore,
    pub pending_orders_dir: PathBuf,
    pub live_positions_dir: PathBuf,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: &FacadeConfig, handler: Arc<dyn CommandHandler>) -> Self {
        let bot_settings = BotSettings {
            is_news_enabled: config.enable_news_search,
            ..Default::default()
        };
        Self {
            auth_token: config.dashboard_token.clone(),
            dispatcher: Dispatcher::new(handler, bot_settings, config.supported_pairs.clone()),
            settings: SettingsStore::new(&config.settings_env_path, &config.config_dir),
            prompts: PromptStore::new(&config.prompt_dir),
            pending_orders_dir: config.pending_orders_dir.clone(),
            live_positions_dir: config.live_positions_dir.clone(),
            started_at: Utc::now(),
        }
    }
}

/// All routes. Everything except `/health` sits behind the bearer check.
pub fn app_router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/status", get(routes::status::get_status))
        .route("/orders", get(routes::orders::get_orders))
        .route("/command", axum::routing::post(routes::command::run_command))
        .route(
            "/settings",
            get(routes::settings::get_settings).post(routes::settings::save_settings),
        )
        .route(
            "/prompts",
            get(routes::prompts::get_prompts).post(routes::prompts::write_prompt),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_bearer,
        ));

    Router::new()
        .route("/health", get(routes::health::health))
        .merge(gated)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
