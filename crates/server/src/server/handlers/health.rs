use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let status = if state.is_ready() { "ok" } else { "unavailable" };
    Json(json!({ "status": status }))
}
