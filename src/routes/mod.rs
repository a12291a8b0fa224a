//! Rutas HTTP

pub mod parts_routes;
pub mod unit_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_middleware;
use crate::state::AppState;

/// Router completo de la aplicación
pub fn create_app_router(state: AppState) -> Router {
    let cors = cors_middleware(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health))
        .nest("/units", unit_routes::create_unit_router())
        .nest("/parts", parts_routes::create_parts_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "unit_service",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
