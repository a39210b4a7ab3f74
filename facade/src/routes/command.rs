use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::json_body;
use crate::error::ApiError;
use crate::AppState;

#[derive(Deserialize)]
pub struct CommandRequest {
    pub command: Option<String>,
}

/// POST /command
///
/// Forwards one command line (e.g. `/cls EURUSD`) and returns every reply.
pub async fn run_command(
    State(state): State<AppState>,
    body: Result<Json<CommandRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = json_body(body)?;
    let command = req
        .command
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No command".into()))?;

    let messages = state.dispatcher.dispatch(&command).await?;
    Ok(Json(json!({ "messages": messages })))
}
