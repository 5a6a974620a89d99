//! API route definitions.

use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::Response,
    routing::post,
    Router,
};
use std::time::Instant;

use super::handlers;
use crate::config::ServerConfig;

/// Creates the API router with all routes configured
pub fn create_router(config: &ServerConfig) -> Router {
    Router::new()
        .route("/parse-pdf", post(handlers::parse_pdf))
        .route("/parse-pptx", post(handlers::parse_pptx))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(middleware::from_fn(log_requests))
}

/// Log method, path, status, and latency of every request.
async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    log::info!(
        "{} {} -> {} ({:?})",
        method,
        path,
        response.status().as_u16(),
        start.elapsed()
    );
    response
}

/// Prints all available routes for logging
pub fn print_routes() {
    log::info!("Available API routes:");
    log::info!("  POST /parse-pdf   - Extract text from a PDF (form: file)");
    log::info!("  POST /parse-pptx  - Extract slide text and images from a PPTX (form: file, mode)");
}
