//! Route definitions and router construction.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new().allow_origin(allowed).allow_methods(Any).allow_headers(Any)
        }
    }
}

/// API routes, unprefixed — nested under `/api` by [`create_router`].
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/runs", post(handlers::runs::create_run).get(handlers::runs::list_runs))
        .route("/runs/:id", get(handlers::runs::get_run))
        .route("/scripts", post(handlers::scripts::create_script).get(handlers::scripts::list_scripts))
        .route("/artifacts/:kind/:filename", get(handlers::artifacts::get_artifact))
        .route("/stats/dashboard", get(handlers::stats::dashboard))
        .route("/stats/pairings", get(handlers::stats::pairings))
        .route("/stats/percentiles", get(handlers::stats::percentiles))
        .route("/export", post(handlers::export::export))
}

/// Build the main Axum router: `/health` plus every API route under `/api`.
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes().with_state(state).layer(cors).layer(TraceLayer::new_for_http()))
}

async fn health_check() -> &'static str {
    "OK"
}
