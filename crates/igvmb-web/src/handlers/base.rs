//! Redirects and liveness.

use axum::response::Redirect;
use axum::Json;
use serde_json::{json, Value};

/// `/` and `/index` both land on the browser page.
pub async fn to_browser() -> Redirect {
    Redirect::permanent("/browser")
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
