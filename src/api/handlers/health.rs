//! Liveness check. Does not touch the database.

use axum::Json;
use serde_json::{Value, json};

/// Always `{"ok": true}`.
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}
