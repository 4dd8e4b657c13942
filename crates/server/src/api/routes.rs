use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use super::{convert, handlers, middleware::metrics_middleware};
use crate::state::AppState;

/// Path of the conversion endpoint, mounted both under `/api/v1` and at the
/// root.
pub const CONVERT_PATH: &str = "/convert/hwp-to-pdf";

pub fn create_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config().server.max_upload_bytes;

    // Conversion, with the configured upload limit instead of axum's default
    let convert_routes = Router::new()
        .route(CONVERT_PATH, post(convert::hwp_to_pdf))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes));

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .merge(convert_routes.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .merge(convert_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
