use axum::{Json, response::IntoResponse};
use chrono::Utc;

pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "X_Three_PL Service API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
