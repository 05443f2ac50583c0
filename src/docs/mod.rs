use utoipa::OpenApi;
use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/api/ready",
    responses(
        (status = 200, description = "Room store is reachable", body = HealthResponse),
        (status = 503, description = "Room store is unreachable", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn ready_check_doc() {}

/// Live rooms, connections and process resources
#[utoipa::path(
    get,
    path = "/api/v1/diagnostics",
    responses(
        (status = 200, description = "Diagnostics snapshot", body = DiagnosticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

/// Shared room websocket (default path; configurable via WS_PATH)
#[utoipa::path(
    get,
    path = "/ws/shared-terminal",
    responses(
        (status = 101, description = "Switched to the shared room websocket"),
        (status = 426, description = "Request carried no websocket upgrade", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn shared_room_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        ready_check_doc,
        diagnostics_doc,
        shared_room_doc,
    ),
    components(
        schemas(HealthResponse, ErrorResponse, DiagnosticsResponse, RoomDiagnostics)
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
