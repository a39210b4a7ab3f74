use std::path::Path;

use serde::Serialize;

use crate::files::{load_json_dir, JsonDocument};

/// One order file. Which partition it lands in depends only on the
/// directory it was read from.
pub type OrderRecord = JsonDocument;

/// Pending orders and live positions, each scanned independently.
#[derive(Debug, Clone, Serialize)]
pub struct OrderBook {
    pub pending: Vec<OrderRecord>,
    pub live: Vec<OrderRecord>,
}

/// Snapshot both order directories.
///
/// A side whose directory is missing or unreadable comes back empty
/// without affecting the other side.
pub async fn aggregate(pending_dir: &Path, live_dir: &Path) -> OrderBook {
    let pending = load_json_dir(pending_dir).await;
    let live = load_json_dir(live_dir).await;
    OrderBook { pending, live }
}
