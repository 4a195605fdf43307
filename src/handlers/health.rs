use axum::{Json, response::IntoResponse};

/// Liveness probe. Does not touch the database.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
