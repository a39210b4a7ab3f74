use std::path::PathBuf;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct FacadeConfig {
    /// Shared bearer secret. Empty means every gated request is refused.
    pub dashboard_token: String,
    pub port: u16,
    pub supported_pairs: Vec<String>,
    pub enable_news_search: bool,
    pub config_dir: PathBuf,
    pub pending_orders_dir: PathBuf,
    pub live_positions_dir: PathBuf,
    pub prompt_dir: PathBuf,
    pub settings_env_path: PathBuf,
    pub command_handler_bin: Option<PathBuf>,
}

impl FacadeConfig {
    /// Load config from a specific .env file, or the default `.env` if None.
    pub fn from_env_file(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => {
                dotenvy::from_filename(p).with_context(|| format!("Load env file {p}"))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self {
            dashboard_token: env("DASHBOARD_TOKEN", ""),
            port: env("PORT", "3000")
                .parse()
                .context("PORT must be a valid u16")?,
            supported_pairs: parse_pairs(&env("SUPPORTED_PAIRS", "")),
            enable_news_search: env("ENABLE_NEWS_SEARCH", "false") == "true",
            config_dir: env("CONFIG_DIR", "config").into(),
            pending_orders_dir: env("PENDING_ORDERS_DIR", "pending_orders").into(),
            live_positions_dir: env("LIVE_POSITIONS_DIR", "live_positions").into(),
            prompt_dir: env("PROMPT_DIR", "prompts").into(),
            settings_env_path: env("SETTINGS_ENV_PATH", ".env").into(),
            command_handler_bin: std::env::var("COMMAND_HANDLER_BIN")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

/// `"eurusd, GBPUSD,"` -> `["EURUSD", "GBPUSD"]`
pub fn parse_pairs(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|p| p.trim().to_uppercase())
        .filter(|p| !p.is_empty())
        .collect()
}

fn env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
