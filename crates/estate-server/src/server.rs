//! HTTP server implementation using Axum.

use crate::handlers::{handle_get_property, handle_health, handle_list_properties};
use anyhow::Context;
use axum::http::HeaderValue;
use axum::{routing::get, Router};
use estate_core::EstateApi;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Origins allowed when none are configured (the local web client).
pub const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Application state shared across handlers.
pub struct AppState {
    pub api: Arc<EstateApi>,
}

/// Build the router with CORS restricted to `allowed_origins`.
pub fn build_router(api: Arc<EstateApi>, allowed_origins: &[String]) -> anyhow::Result<Router> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid allowed origin: {}", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    let state = Arc::new(AppState { api });

    Ok(Router::new()
        .route("/health", get(handle_health))
        .route("/api/v1/properties", get(handle_list_properties))
        .route("/api/v1/properties/:id", get(handle_get_property))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state))
}

/// Start the HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(
    api: Arc<EstateApi>,
    host: &str,
    port: u16,
    allowed_origins: &[String],
) -> anyhow::Result<SocketAddr> {
    let app = build_router(api, allowed_origins)?;

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}
