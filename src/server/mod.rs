//! HTTP server exposing the dispatcher
//!
//! `POST /api/analyze` is the only endpoint that reaches a model vendor.
//! The rest are cheap status endpoints.

pub mod routes;
pub mod state;

pub use routes::ErrorBody;
pub use state::ServerAppState;

use crate::config::ServerConfig;
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::get,
    Router,
};
use routes::{analyze_routes, config_routes, legacy_routes};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Path the original serverless client posts to; answers in its response shape
pub const LEGACY_ANALYZE_PATH: &str = "/.netlify/functions/analyze";

fn cors_layer(cors_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    if cors_origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let allowed_origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(allowed_origins)
    }
}

/// Build the application router. CORS is the outermost layer so preflights never reach a handler.
pub fn build_router(state: ServerAppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api/analyze", analyze_routes::analyze_method_router())
        .route(LEGACY_ANALYZE_PATH, legacy_routes::legacy_method_router())
        .route("/api/providers", get(config_routes::providers_handler))
        .route("/api/version", get(config_routes::version_handler))
        .route("/health", get(health_handler))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Serve until the shared shutdown flag is raised
pub async fn run_server(config: &ServerConfig, state: ServerAppState) -> Result<(), String> {
    let addr: SocketAddr = format!("{}:{}", config.bind, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let shutdown = state.shutdown_state.clone();
    let dispatcher = state.dispatcher.clone();
    let app = build_router(state, &config.cors_origins);

    let cors_display = if config.cors_origins.is_empty() {
        "*".to_string()
    } else {
        config.cors_origins.join(", ")
    };
    let candidates = dispatcher.config().effective_candidates();

    println!("\nVEXT dispatcher");
    println!("  Listening:  http://{}", addr);
    println!("  Vendor:     {}", dispatcher.vendor());
    println!(
        "  Candidates: {}",
        candidates
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    );
    println!(
        "  API key:    {}",
        if dispatcher.has_credentials() {
            "configured"
        } else {
            "MISSING (requests will fail with a configuration error)"
        }
    );
    println!("  CORS:       {}\n", cors_display);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.wait())
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    log::info!("Server stopped");
    Ok(())
}

async fn health_handler() -> &'static str {
    "OK"
}
