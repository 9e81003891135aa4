//! HTTP routes

pub mod query;
pub mod upload;

use axum::Json;
use serde_json::{json, Value};

/// GET / - Service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Trading Bot API is running!",
        "status": "healthy"
    }))
}

/// GET /health - Liveness check, independent of downstream services
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
