use maitred_core::MaitredError;

/// Errors from the Google integration.
#[derive(Debug, thiserror::Error)]
pub enum GoogleError {
    #[error("not authorized: no stored tokens, run the /auth flow first")]
    NotAuthorized,
    #[error("request failed: {0}")]
    Request(String),
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("booking cannot be written: {0}")]
    InvalidBooking(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("token record error: {0}")]
    TokenRecord(String),
}

impl From<reqwest::Error> for GoogleError {
    fn from(err: reqwest::Error) -> Self {
        GoogleError::Request(err.to_string())
    }
}

impl From<GoogleError> for MaitredError {
    fn from(err: GoogleError) -> Self {
        MaitredError::Google(err.to_string())
    }
}
