use super::error::ApiError;
use super::state::AppState;
use crate::definition::handlers::{handle_stats, handle_word};
use crate::search::handlers::{handle_chapter, handle_frequency, handle_search};
use axum::extract::Request;
use axum::http::Uri;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

pub fn build_router(state: &AppState) -> Router {
    Router::new()
        .route("/api/word", post(handle_word))
        .route("/api/word/stats", get(handle_stats))
        .route("/api/search", get(handle_search))
        .route("/api/chapter/:book/:chapter", get(handle_chapter))
        .route("/api/frequency", get(handle_frequency))
        .route("/api", get(handle_api_info))
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .layer(Extension(state.corpus.clone()))
        .layer(Extension(state.definitions.clone()))
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    tracing::info!("{} {} -> {}", method, uri, response.status().as_u16());
    response
}

async fn handle_health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn handle_api_info() -> Json<Value> {
    Json(json!({
        "name": "Bible App API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/api/word": "POST - Get word definition",
            "/api/word/stats": "GET - Definition cache counters",
            "/api/search": "GET - Search Bible verses (?q=)",
            "/api/chapter/{book}/{chapter}": "GET - Verses of one chapter",
            "/api/frequency": "GET - Word frequency by book and testament (?word=)",
            "/health": "GET - Health check",
        }
    }))
}

async fn handle_not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
