use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{debug, error};

use crate::models::{ErrorResponse, HealthResponse};
use crate::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
    })
}

/// Readiness check endpoint; fails while the room store is unreachable
pub async fn ready_check(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Readiness check requested");
    let store = app_state.rooms.store();
    if let Err(e) = store.ping().await {
        error!("Room store ({}) is not reachable: {}", store.backend(), e);
        return Err(ErrorResponse::reply(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("{} store unavailable", store.backend()),
        ));
    }

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        message: format!("Service is ready ({} store)", store.backend()),
    }))
}
