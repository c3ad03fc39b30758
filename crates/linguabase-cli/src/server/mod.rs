//! # HTTP Server
//!
//! The document API and the service proxy behind one axum router.

mod document_routes;
mod error;
mod proxy_routes;

#[cfg(test)]
mod tests;

use std::future::Future;
use std::sync::Arc;

use axum::{routing::get, Json, Router};
use linguabase_core::{DocumentStore, ServiceProxy};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ServerConfig;
use document_routes::document_routes;
use proxy_routes::proxy_routes;

/// Endpoints listed by the banner
const ENDPOINTS: &[&str] = &[
    "/health",
    "/api/knowledge_base",
    "/api/prompts",
    "/api/practice_history",
    "/api/dialogue_phrases",
    "/api/validation",
    "/api/generate-audio",
    "/api/transcribe-audio",
    "/api/chat",
];

/// State shared by every handler
#[derive(Debug)]
pub struct AppState {
    pub store: DocumentStore,
    pub proxy: ServiceProxy,
}

impl AppState {
    pub fn new(store: DocumentStore, proxy: ServiceProxy) -> Self {
        Self { store, proxy }
    }
}

/// Build the combined router with all endpoints
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .nest("/api", document_routes(state.clone()).merge(proxy_routes(state)))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.cors_origins)),
        )
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<_> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn banner() -> Json<Value> {
    Json(json!({
        "message": "Linguabase API",
        "version": linguabase_core::VERSION,
        "endpoints": ENDPOINTS,
    }))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Serve `router` on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
