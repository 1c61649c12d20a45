use axum::{Router, routing::get};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::query_engine::QueryEngine;

pub mod errors;
pub mod handlers;
pub mod models;

pub fn create_router(query_engine: Arc<QueryEngine>, static_dir: impl AsRef<Path>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // API routes
        .route("/api/advocates", get(handlers::search_handler))
        .with_state(query_engine)
        // Static file serving for the UI
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(cors)
}
