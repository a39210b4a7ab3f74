use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

/// GET /status
///
/// Runs the bot's status command and returns the last message it produced.
pub async fn get_status(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let message = state.dispatcher.status_message().await?;
    Ok(Json(json!({ "message": message })))
}
