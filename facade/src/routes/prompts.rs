use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{json_body, query_params};
use crate::error::ApiError;
use crate::files::sanitize_file_name;
use crate::AppState;

#[derive(Deserialize)]
pub struct PromptQuery {
    pub file: Option<String>,
}

#[derive(Deserialize)]
pub struct WritePromptRequest {
    pub file: Option<String>,
    pub content: Option<String>,
}

/// GET /prompts[?file=name]
///
/// Without `file`, lists the prompt directory. With it, returns that file's text.
pub async fn get_prompts(
    State(state): State<AppState>,
    query: Result<Query<PromptQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let params = query_params(query)?;
    match params.file.filter(|f| !f.is_empty()) {
        Some(file) => {
            sanitize_file_name(&file).map_err(ApiError::BadRequest)?;
            let content = state.prompts.read(&file).await.ok_or(ApiError::NotFound)?;
            Ok(Json(json!({ "file": file, "content": content })))
        }
        None => {
            let files = state.prompts.list().await?;
            Ok(Json(json!({ "files": files })))
        }
    }
}

/// POST /prompts
///
/// Creates or replaces one prompt file. Missing content writes an empty file.
pub async fn write_prompt(
    State(state): State<AppState>,
    body: Result<Json<WritePromptRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = json_body(body)?;
    let file = req
        .file
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No file".into()))?;
    sanitize_file_name(&file).map_err(ApiError::BadRequest)?;

    let content = req.content.unwrap_or_default();
    state.prompts.write(&file, &content).await?;
    info!("Prompt {} written ({} bytes)", file, content.len());

    Ok(Json(json!({ "status": "ok" })))
}
