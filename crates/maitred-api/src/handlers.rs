//! Route handler functions for all API endpoints.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Redirect};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::assistant::run_turn;
use crate::error::ApiError;
use crate::state::AppState;
use crate::stream::encode_payload;

// =============================================================================
// Request / response types
// =============================================================================

/// Body of `POST /api/assistant`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    /// Session identifier from a previous turn, if any.
    pub session_id: Option<String>,
    /// The user's message.
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthCallbackParams {
    pub code: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/assistant - one conversation turn as a `text/event-stream`.
///
/// The turn runs in its own task and feeds an ordered channel; frames are
/// relayed to the client as they are produced. A session id that does not
/// parse as a UUID is treated as absent, so the store never keys on
/// arbitrary client-chosen strings.
pub async fn assistant(
    State(state): State<AppState>,
    Json(body): Json<AssistantRequest>,
) -> impl IntoResponse {
    let requested = body
        .session_id
        .as_deref()
        .and_then(|s| Uuid::parse_str(s).ok());
    let message = body.message.unwrap_or_default();

    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(run_turn(state, requested, message, tx));

    let stream = ReceiverStream::new(rx)
        .map(|event| Ok::<Event, Infallible>(Event::default().data(encode_payload(&event))));

    (
        [(header::CACHE_CONTROL, "no-cache")],
        Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))),
    )
}

/// GET /api/health - health check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /auth - redirect to the Google consent URL.
pub async fn auth_redirect(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.tokens.consent_url())
}

/// GET /auth/callback?code=... - exchange the code for long-lived tokens.
pub async fn auth_callback(
    State(state): State<AppState>,
    Query(params): Query<AuthCallbackParams>,
) -> Result<&'static str, ApiError> {
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing authorization code.".to_string()))?;

    state
        .tokens
        .exchange_code(&code)
        .await
        .map_err(|e| ApiError::Internal(format!("Token exchange failed: {e}")))?;

    Ok("Authorization successful! Tokens saved.")
}

/// GET /ui - serve the embedded chat page.
pub async fn ui() -> impl IntoResponse {
    Html(maitred_ui::CHAT_HTML)
}
