use crate::api::{handlers, AppState};
use crate::metrics;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(handlers::health_check))
        // Metrics endpoint
        .route("/metrics", get(handlers::metrics))
        // KB document management
        .route("/v1/docs", post(handlers::create_doc))
        .route(
            "/v1/docs/:id",
            put(handlers::update_doc).delete(handlers::delete_doc),
        )
        // Search
        .route("/v1/search", get(handlers::search))
        // Diagnostics
        .route("/v1/kb/info", get(handlers::kb_info))
        .with_state(state)
        // Middleware stack (applied bottom-to-top: metrics -> trace -> cors)
        .layer(middleware::from_fn(metrics::track_http_metrics))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new())
                .on_response(DefaultOnResponse::new()),
        )
        .layer(CorsLayer::permissive())
}
