use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::json_body;
use crate::env_codec::SettingsMap;
use crate::error::ApiError;
use crate::files::sanitize_file_name;
use crate::settings::{check_known_keys, SettingsSnapshot};
use crate::AppState;

#[derive(Deserialize)]
pub struct SaveSettingsRequest {
    pub env: Option<SettingsMap>,
    pub configs: Option<Vec<ConfigBlobInput>>,
}

#[derive(Deserialize)]
pub struct ConfigBlobInput {
    pub file: Option<String>,
    pub data: Option<Value>,
}

/// GET /settings
///
/// The parsed `.env` mapping plus every JSON config blob.
pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsSnapshot> {
    Json(state.settings.load().await)
}

/// POST /settings
///
/// `env`, when present, replaces the whole `.env` file. Each config entry with
/// both a file name and non-null data replaces that blob; other entries are
/// ignored. All file names are checked before anything is written.
pub async fn save_settings(
    State(state): State<AppState>,
    body: Result<Json<SaveSettingsRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = json_body(body)?;

    let mut blobs = Vec::new();
    for blob in req.configs.unwrap_or_default() {
        let (Some(file), Some(data)) = (blob.file, blob.data) else {
            continue;
        };
        if file.is_empty() || data.is_null() {
            continue;
        }
        sanitize_file_name(&file).map_err(ApiError::BadRequest)?;
        blobs.push((file, data));
    }

    let mut warnings = Vec::new();
    if let Some(env) = &req.env {
        warnings = check_known_keys(env);
        for w in &warnings {
            warn!("Settings check: {}", w);
        }
        state.settings.save_env(env).await?;
        info!("Settings file replaced ({} keys)", env.len());
    }

    for (file, data) in &blobs {
        state.settings.save_config(file, data).await?;
        info!("Config {} replaced", file);
    }

    Ok(Json(json!({ "status": "ok", "warnings": warnings })))
}
