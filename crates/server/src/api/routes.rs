use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{addon, handlers, middleware::metrics_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Operational routes
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config));

    // Add-on routes; ids carry a `.json` suffix that handlers strip
    Router::new()
        .route("/manifest.json", get(addon::manifest))
        .route("/catalog/{content_type}/{file}", get(addon::catalog))
        .route(
            "/catalog/{content_type}/{catalog_id}/{extra}",
            get(addon::catalog_with_extra),
        )
        .route("/meta/{content_type}/{file}", get(addon::meta))
        .route("/stream/{content_type}/{file}", get(addon::stream))
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
