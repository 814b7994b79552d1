//! Application state shared across all route handlers.
//!
//! AppState holds references to all services and shared resources.
//! It is passed to handlers via axum's State extractor.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use maitred_core::MaitredConfig;
use maitred_google::{BookingSaver, CalendarSink, SheetSink, TokenManager};
use maitred_llm::{BookingExtractor, ChatClient};
use maitred_store::SessionStore;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks. The
/// language model client is optional: without an API key the guided flow
/// still works and the free-chat paths degrade to an apology frame.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration (read-only after startup).
    pub config: Arc<MaitredConfig>,
    /// Per-conversation session state.
    pub store: Arc<dyn SessionStore>,
    /// Chat-completion client, when an API key is available.
    pub llm: Option<Arc<ChatClient>>,
    /// LLM booking extraction (extraction strategy only).
    pub extractor: Option<Arc<BookingExtractor>>,
    /// OAuth token management for the Google APIs.
    pub tokens: Arc<TokenManager>,
    /// Best-effort booking persistence.
    pub saver: Arc<BookingSaver>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Wire up the full service graph from config.
    pub fn new(
        config: MaitredConfig,
        store: Arc<dyn SessionStore>,
        llm: Option<ChatClient>,
    ) -> Self {
        let tokens_path = PathBuf::from(&config.general.data_dir).join(&config.google.tokens_path);
        let client_secret = if config.google.client_secret.is_empty() {
            std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default()
        } else {
            config.google.client_secret.clone()
        };

        let tokens = Arc::new(TokenManager::new(
            config.google.client_id.clone(),
            client_secret,
            config.google.redirect_uri.clone(),
            tokens_path,
        ));

        let saver = Arc::new(BookingSaver::new(
            Arc::clone(&tokens),
            CalendarSink::new(
                config.google.calendar_id.clone(),
                config.google.time_zone.clone(),
            ),
            SheetSink::new(
                config.google.spreadsheet_id.clone(),
                config.google.sheet_range.clone(),
            ),
            config.google.enabled,
        ));

        let llm = llm.map(Arc::new);
        let extractor = llm.as_ref().map(|client| {
            Arc::new(BookingExtractor::new(
                (**client).clone(),
                config.chat.history_window,
                config.llm.extraction_temperature,
            ))
        });

        Self {
            config: Arc::new(config),
            store,
            llm,
            extractor,
            tokens,
            saver,
            start_time: Instant::now(),
        }
    }
}
