use maitred_core::MaitredError;

/// Errors from the language-model client.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Request(String),
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("response carried no content")]
    NoContent,
    #[error("stream error: {0}")]
    Stream(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Request(err.to_string())
    }
}

impl From<LlmError> for MaitredError {
    fn from(err: LlmError) -> Self {
        MaitredError::Llm(err.to_string())
    }
}
