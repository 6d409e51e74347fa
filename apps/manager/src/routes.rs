// [apps/manager/src/routes.rs]
//! Axum router wiring for the Ingress API (spec §4.7).

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{get_crack_status, health, submit_crack_request};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/hash/crack", post(submit_crack_request))
        .route("/api/hash/status", get(get_crack_status))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
