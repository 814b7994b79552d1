//! maitred API crate - axum HTTP server, route handlers, SSE streaming.
//!
//! Exposes the assistant endpoint (one long-lived `text/event-stream`
//! response per turn), the health check, the OAuth bootstrap endpoints,
//! and the embedded chat page.

pub mod assistant;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod stream;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
