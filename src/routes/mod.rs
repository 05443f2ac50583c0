pub mod api;

use axum::{
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::any,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::models::ErrorResponse;
use crate::websocket::shared_room_gateway;
use crate::AppState;
pub use api::create_api_routes;

/// Assemble the full application router
pub fn create_app(app_state: Arc<AppState>) -> Router {
    let ws_path = app_state.config.ws_path.clone();
    let cors = app_state.config.cors_origins.as_deref().and_then(cors_layer);

    let app = Router::new()
        .nest("/api", create_api_routes())
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route(&ws_path, any(shared_room_gateway))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http());

    let app = match cors {
        Some(cors) => app.layer(cors),
        None => app,
    };
    app.with_state(app_state)
}

async fn not_found() -> impl IntoResponse {
    ErrorResponse::reply(StatusCode::NOT_FOUND, "Not found")
}

fn cors_layer(origins: &str) -> Option<CorsLayer> {
    let origins = origins.trim();
    if origins.is_empty() {
        return None;
    }
    if origins == "*" {
        debug!("CORS open to any origin");
        return Some(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));
    }

    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();
    if allowed.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
