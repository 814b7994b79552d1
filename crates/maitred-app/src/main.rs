//! maitred application binary - composition root.
//!
//! Ties together all maitred crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Pick the session store backend (in-memory or file-per-session)
//! 3. Build the language-model client (if an API key is present)
//! 4. Start the axum HTTP server (assistant, health, OAuth, chat page)

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use maitred_api::{routes, AppState};
use maitred_core::MaitredConfig;
use maitred_llm::ChatClient;
use maitred_store::{FileStore, MemoryStore, SessionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = MaitredConfig::load_or_default(&config_file);
    if let Some(port) = args.port {
        config.general.port = port;
    } else if let Ok(port) = std::env::var("MAITRED_PORT") {
        if let Ok(port) = port.parse() {
            config.general.port = port;
        }
    }
    if let Some(ref data_dir) = args.data_dir {
        config.general.data_dir = data_dir.display().to_string();
    }
    if let Some(ref level) = args.log_level {
        config.general.log_level = level.clone();
    }

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.general.log_level.clone())
            }),
        )
        .init();

    tracing::info!("Starting maitred v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Data directory.
    let data_dir = PathBuf::from(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }

    // Session store.
    let store: Arc<dyn SessionStore> = match config.store.backend.as_str() {
        "file" => {
            let sessions_dir = data_dir.join(&config.store.sessions_dir);
            tracing::info!(dir = %sessions_dir.display(), "Using file session store");
            Arc::new(FileStore::new(sessions_dir)?)
        }
        other => {
            if other != "memory" {
                tracing::warn!(backend = %other, "Unknown store backend, using memory");
            }
            tracing::info!("Using in-memory session store");
            Arc::new(MemoryStore::new())
        }
    };

    // Language model client.
    let llm = match ChatClient::from_config(&config.llm) {
        Ok(client) => {
            tracing::info!(model = %config.llm.model, "Language model client ready");
            Some(client)
        }
        Err(e) => {
            tracing::warn!(error = %e, "No language model; free-form chat will apologize");
            None
        }
    };

    tracing::info!(strategy = ?config.chat.strategy, "Booking strategy selected");

    let port = config.general.port;
    let state = AppState::new(config, store, llm);

    if !state.tokens.is_authorized() {
        tracing::warn!(
            "Google APIs not authorized yet; visit http://127.0.0.1:{}/auth to connect",
            port
        );
    }

    tracing::info!("Chat page at http://127.0.0.1:{}/ui", port);
    routes::start_server(port, state).await?;

    Ok(())
}
