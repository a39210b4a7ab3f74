use axum::extract::State;
use axum::Json;

use crate::orders::{aggregate, OrderBook};
use crate::AppState;

/// GET /orders
///
/// Pending orders and live positions, re-read from disk on every call.
pub async fn get_orders(State(state): State<AppState>) -> Json<OrderBook> {
    Json(aggregate(&state.pending_orders_dir, &state.live_positions_dir).await)
}
