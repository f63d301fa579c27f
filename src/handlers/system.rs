// handlers/system.rs - service info and health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Portfolio API",
        "version": version,
        "endpoints": {
            "auth": "/api/auth/login, /api/auth/logout (public), /api/auth/me (bearer)",
            "profile": "/api/profile (GET public, PUT bearer)",
            "projects": "/api/projects[/:id|/reorder] (GET public, writes bearer)",
            "contacts": "/api/contacts[/:id|/reorder] (GET public, writes bearer)",
            "health": "/health"
        }
    }))
}

/// Any path without a route
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

/// A routed path called with a method it does not serve
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Method not allowed")
}

/// GET /health - 200 when the database answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.health.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable("Database unavailable").into_response()
        }
    }
}
