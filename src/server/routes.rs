// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{
    health_handler, index_handler, metrics_handler, solve_api_handler, solve_page_handler,
};
use super::middleware::request_id_layers;
use crate::config::AppConfig;
use crate::error::Result;
use crate::solver::Solver;
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub solver: Solver,
}

pub fn create_router(config: AppConfig, solver: Solver) -> Result<Router> {
    let max_body = config.upload.max_bytes;
    let state = AppState {
        config: Arc::new(config),
        solver,
    };

    let (set_request_id, propagate_request_id) = request_id_layers();

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/solve", post(solve_page_handler))
        .route("/api/solve", post(solve_api_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        // the multipart extractor reports an oversized body as a 413 error,
        // which the solve handlers turn into a readable message
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state);

    Ok(app)
}
