use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::env_codec::{self, SettingsMap};
use crate::files::{load_json_dir, write_atomic, JsonDocument};

/// A named JSON document under the config directory.
pub type ConfigBlob = JsonDocument;

/// Everything `GET /settings` reports.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsSnapshot {
    pub env: SettingsMap,
    pub configs: Vec<ConfigBlob>,
}

/// The flat `.env` settings file plus the JSON config directory.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    env_path: PathBuf,
    config_dir: PathBuf,
}

impl SettingsStore {
    pub fn new(env_path: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            env_path: env_path.into(),
            config_dir: config_dir.into(),
        }
    }

    /// Re-read both sources. A missing `.env` reads as an empty mapping and a
    /// missing config directory as no blobs.
    pub async fn load(&self) -> SettingsSnapshot {
        let env = match tokio::fs::read_to_string(&self.env_path).await {
            Ok(text) => env_codec::parse(&text),
            Err(e) => {
                debug!("No settings file at {}: {}", self.env_path.display(), e);
                SettingsMap::new()
            }
        };
        let configs = load_json_dir(&self.config_dir).await;
        SettingsSnapshot { env, configs }
    }

    /// Replace the whole `.env` file with `env`.
    pub async fn save_env(&self, env: &SettingsMap) -> Result<()> {
        write_atomic(&self.env_path, env_codec::stringify(env).as_bytes()).await
    }

    /// Replace one config blob. `file` must already be sanitized.
    pub async fn save_config(&self, file: &str, data: &Value) -> Result<()> {
        let body = serde_json::to_string_pretty(data)
            .with_context(|| format!("Serialize config {file}"))?;
        write_atomic(&self.config_dir.join(file), body.as_bytes()).await
    }
}

/// Advisory checks on the settings keys the trading bot is known to read.
///
/// Unknown keys are never inspected and nothing here rejects a save; the
/// returned messages are only reported back to the caller.
pub fn check_known_keys(env: &SettingsMap) -> Vec<String> {
    let mut warnings = Vec::new();

    for (key, value) in env {
        let value = value.trim();
        match key.as_str() {
            "TRADE_VOLUME" => {
                if !value.parse::<f64>().is_ok_and(|v| v.is_finite() && v > 0.0) {
                    warnings.push(format!("{key} should be a positive number, got '{value}'"));
                }
            }
            "MONITORING_INTERVAL_MINUTES" => {
                if !value.parse::<u64>().is_ok_and(|v| v > 0) {
                    warnings.push(format!("{key} should be a positive whole number, got '{value}'"));
                }
            }
            "SUPPORTED_PAIRS" => {
                let bad = value
                    .split(',')
                    .map(str::trim)
                    .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_alphanumeric()));
                if bad {
                    warnings.push(format!("{key} should be a comma-separated list of symbols"));
                }
            }
            k if k.ends_with("_URL") => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    warnings.push(format!("{key} should start with http:// or https://"));
                }
            }
            _ => {}
        }
    }

    warnings
}
