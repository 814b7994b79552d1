//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, and all endpoint
//! handlers.

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The chat page may be embedded anywhere; the endpoint carries no
    // credentials, so permissive CORS is fine.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/assistant", post(handlers::assistant))
        .route("/api/health", get(handlers::health))
        .route("/auth", get(handlers::auth_redirect))
        .route("/auth/callback", get(handlers::auth_callback))
        .route("/ui", get(handlers::ui))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured address.
///
/// Binds to 127.0.0.1 (localhost only) on the port from config.
pub async fn start_server(port: u16, state: AppState) -> Result<(), maitred_core::MaitredError> {
    let addr = format!("127.0.0.1:{}", port);

    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| maitred_core::MaitredError::Api(format!("Failed to bind: {e}")))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| maitred_core::MaitredError::Api(format!("Server error: {e}")))?;

    Ok(())
}
