// HTTP routes

mod error;
mod http;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::history_store::HistoryStore;

pub use error::ApiError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Arc<HistoryStore>,
}

pub fn app(store: Arc<HistoryStore>, config: &AppConfig) -> Router {
    let state = AppState { store };
    Router::new()
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/upload/", post(http::upload_handler)) // POST /api/upload/
        .route("/api/history/", get(http::history_handler)) // GET /api/history/
        .route("/api/summary/{id}/", get(http::summary_handler)) // GET /api/summary/{id}/
        .route("/api/pdf/{id}/", get(http::pdf_handler)) // GET /api/pdf/{id}/
        .layer(DefaultBodyLimit::max(config.upload.max_upload_bytes))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
