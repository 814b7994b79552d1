use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MaitredError, Result};
use crate::types::BookingStrategy;

/// Top-level configuration for the maitred application.
///
/// Loaded from `maitred.toml` by default. Each section corresponds to a
/// subsystem crate or cross-cutting concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaitredConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub google: GoogleConfig,
}

impl Default for MaitredConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            chat: ChatConfig::default(),
            llm: LlmConfig::default(),
            store: StoreConfig::default(),
            google: GoogleConfig::default(),
        }
    }
}

impl MaitredConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MaitredConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MaitredError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Port the HTTP server binds on (localhost only).
    pub port: u16,
    /// Data directory for session files and OAuth tokens.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: "./data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Conversation behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// How booking fields are gathered: guided question sequence, or
    /// free conversation with post-turn extraction.
    pub strategy: BookingStrategy,
    /// Number of most recent history messages fed to the extraction call.
    pub history_window: usize,
    /// Character count per streamed chunk when replaying a fixed prompt.
    pub chunk_size: usize,
    /// Maximum accepted message length in characters.
    pub max_message_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            strategy: BookingStrategy::Guided,
            history_window: 15,
            chunk_size: 40,
            max_message_length: 2000,
        }
    }
}

/// Language model settings.
///
/// The API key is intentionally not part of the config file; it is read
/// from the `OPENAI_API_KEY` environment variable at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// Model identifier for chat and extraction calls.
    pub model: String,
    /// Sampling temperature for the extraction call.
    pub extraction_temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            extraction_temperature: 0.1,
        }
    }
}

/// Session store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend: "memory" (process lifetime) or "file" (one file per session).
    pub backend: String,
    /// Directory for session files, relative to `general.data_dir`.
    pub sessions_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            sessions_dir: "sessions".to_string(),
        }
    }
}

/// Google Calendar / Sheets integration settings.
///
/// `client_secret` is read from the `GOOGLE_CLIENT_SECRET` environment
/// variable when empty, so the config file can be committed without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Whether booking persistence is active at all.
    pub enabled: bool,
    /// Target calendar for event inserts.
    pub calendar_id: String,
    /// Target spreadsheet for booking rows.
    pub spreadsheet_id: String,
    /// A1-notation range the booking row is appended to.
    pub sheet_range: String,
    /// IANA time zone attached to calendar event timestamps.
    pub time_zone: String,
    /// OAuth2 client id.
    pub client_id: String,
    /// OAuth2 client secret (prefer the environment variable).
    pub client_secret: String,
    /// Redirect URI registered for the OAuth2 client.
    pub redirect_uri: String,
    /// Token file path, relative to `general.data_dir`.
    pub tokens_path: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            calendar_id: "primary".to_string(),
            spreadsheet_id: String::new(),
            sheet_range: "Bookings!A1".to_string(),
            time_zone: "America/New_York".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:3000/auth/callback".to_string(),
            tokens_path: "tokens.json".to_string(),
        }
    }
}
