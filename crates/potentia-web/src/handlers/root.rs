//! Service banner.

use axum::Json;

pub async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Computational Drug Discovery API" }))
}
