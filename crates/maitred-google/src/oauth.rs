//! OAuth2 bootstrap and token storage for the Google APIs.
//!
//! The flow is the standard web-server grant: `/auth` redirects the
//! operator to the consent URL built here, `/auth/callback` hands the
//! returned code to [`TokenManager::exchange_code`], and the long-lived
//! tokens land in a local JSON file. Calls thereafter use the stored
//! access token, refreshing it through the refresh token when expired.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GoogleError;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/spreadsheets",
];

/// Token set persisted to disk between runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Instant the access token stops being valid.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredTokens {
    /// Whether the access token should be refreshed before use.
    ///
    /// A missing expiry is treated as still valid; the API will reject it
    /// if not and that failure is logged like any other.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(at) => now >= at - Duration::seconds(30),
            None => false,
        }
    }
}

/// Owns the OAuth2 client credentials and the persisted token set.
pub struct TokenManager {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    tokens_path: PathBuf,
    tokens: Mutex<Option<StoredTokens>>,
}

impl TokenManager {
    /// Create a manager, loading any previously persisted tokens.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        tokens_path: impl AsRef<Path>,
    ) -> Self {
        let tokens_path = tokens_path.as_ref().to_path_buf();
        let tokens = load_tokens(&tokens_path);
        if tokens.is_some() {
            tracing::info!(path = %tokens_path.display(), "OAuth tokens loaded");
        } else {
            tracing::info!(
                path = %tokens_path.display(),
                "No stored OAuth tokens, run the /auth flow to authorize"
            );
        }
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            tokens_path,
            tokens: Mutex::new(tokens),
        }
    }

    /// Whether a token set is available at all.
    pub fn is_authorized(&self) -> bool {
        self.tokens.lock().map(|t| t.is_some()).unwrap_or(false)
    }

    /// The consent URL the operator is redirected to.
    pub fn consent_url(&self) -> String {
        let url = reqwest::Url::parse_with_params(
            AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("scope", &SCOPES.join(" ")),
            ],
        )
        .expect("static auth URL is valid");
        url.to_string()
    }

    /// Exchange an authorization code for tokens and persist them.
    pub async fn exchange_code(&self, code: &str) -> Result<(), GoogleError> {
        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("redirect_uri", &self.redirect_uri),
            ])
            .send()
            .await?;

        let tokens = parse_token_response(response).await?;
        self.store(tokens)
    }

    /// Current access token, refreshed first if expired.
    pub async fn access_token(&self) -> Result<String, GoogleError> {
        let snapshot = {
            let guard = self
                .tokens
                .lock()
                .map_err(|_| GoogleError::TokenRecord("token lock poisoned".to_string()))?;
            guard.clone()
        };

        let Some(tokens) = snapshot else {
            return Err(GoogleError::NotAuthorized);
        };

        if !tokens.is_expired(Utc::now()) {
            return Ok(tokens.access_token);
        }

        let Some(refresh_token) = tokens.refresh_token.clone() else {
            // Expired with nothing to refresh from: let the API reject it.
            return Ok(tokens.access_token);
        };

        tracing::debug!("Access token expired, refreshing");
        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
            ])
            .send()
            .await?;

        let mut refreshed = parse_token_response(response).await?;
        // Google omits the refresh token on refresh responses; keep ours.
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = Some(refresh_token);
        }
        let access = refreshed.access_token.clone();
        self.store(refreshed)?;
        Ok(access)
    }

    fn store(&self, tokens: StoredTokens) -> Result<(), GoogleError> {
        if let Some(parent) = self.tokens_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&tokens)
            .map_err(|e| GoogleError::TokenRecord(e.to_string()))?;
        std::fs::write(&self.tokens_path, json)?;
        tracing::info!(path = %self.tokens_path.display(), "OAuth tokens saved");

        let mut guard = self
            .tokens
            .lock()
            .map_err(|_| GoogleError::TokenRecord("token lock poisoned".to_string()))?;
        *guard = Some(tokens);
        Ok(())
    }
}

fn load_tokens(path: &Path) -> Option<StoredTokens> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(tokens) => Some(tokens),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unreadable token file, ignoring");
            None
        }
    }
}

async fn parse_token_response(response: reqwest::Response) -> Result<StoredTokens, GoogleError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        return Err(GoogleError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    let wire: TokenResponse = response
        .json()
        .await
        .map_err(|e| GoogleError::TokenRecord(format!("bad token response: {e}")))?;

    Ok(StoredTokens {
        access_token: wire.access_token,
        refresh_token: wire.refresh_token,
        expires_at: wire
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs)),
    })
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with_path(path: &Path) -> TokenManager {
        TokenManager::new(
            "client-id",
            "client-secret",
            "http://localhost:3000/auth/callback",
            path,
        )
    }

    // ---- Consent URL ----

    #[test]
    fn test_consent_url_carries_params() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with_path(&dir.path().join("tokens.json"));
        let url = manager.consent_url();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("calendar"));
        assert!(url.contains("spreadsheets"));
    }

    // ---- Token persistence ----

    #[test]
    fn test_starts_unauthorized_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with_path(&dir.path().join("tokens.json"));
        assert!(!manager.is_authorized());
    }

    #[test]
    fn test_loads_persisted_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let tokens = StoredTokens {
            access_token: "at".to_string(),
            refresh_token: Some("rt".to_string()),
            expires_at: None,
        };
        std::fs::write(&path, serde_json::to_string(&tokens).unwrap()).unwrap();

        let manager = manager_with_path(&path);
        assert!(manager.is_authorized());
    }

    #[test]
    fn test_corrupt_token_file_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "{ nope").unwrap();

        let manager = manager_with_path(&path);
        assert!(!manager.is_authorized());
    }

    #[tokio::test]
    async fn test_access_token_unauthorized_errors() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with_path(&dir.path().join("tokens.json"));
        let err = manager.access_token().await.unwrap_err();
        assert!(matches!(err, GoogleError::NotAuthorized));
    }

    #[tokio::test]
    async fn test_access_token_returned_when_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let tokens = StoredTokens {
            access_token: "valid-token".to_string(),
            refresh_token: Some("rt".to_string()),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        };
        std::fs::write(&path, serde_json::to_string(&tokens).unwrap()).unwrap();

        let manager = manager_with_path(&path);
        assert_eq!(manager.access_token().await.unwrap(), "valid-token");
    }

    #[tokio::test]
    async fn test_expired_without_refresh_token_returned_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let tokens = StoredTokens {
            access_token: "stale-token".to_string(),
            refresh_token: None,
            expires_at: Some(Utc::now() - Duration::hours(1)),
        };
        std::fs::write(&path, serde_json::to_string(&tokens).unwrap()).unwrap();

        let manager = manager_with_path(&path);
        assert_eq!(manager.access_token().await.unwrap(), "stale-token");
    }

    // ---- Expiry logic ----

    #[test]
    fn test_is_expired_honors_skew_window() {
        let now = Utc::now();
        let tokens = StoredTokens {
            access_token: "t".to_string(),
            refresh_token: None,
            expires_at: Some(now + Duration::seconds(10)),
        };
        // Within the 30 second skew window counts as expired.
        assert!(tokens.is_expired(now));

        let tokens = StoredTokens {
            expires_at: Some(now + Duration::hours(1)),
            ..tokens
        };
        assert!(!tokens.is_expired(now));
    }

    #[test]
    fn test_missing_expiry_counts_as_valid() {
        let tokens = StoredTokens {
            access_token: "t".to_string(),
            refresh_token: None,
            expires_at: None,
        };
        assert!(!tokens.is_expired(Utc::now()));
    }
}
