use thiserror::Error;

/// Top-level error type for the maitred system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for MaitredError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MaitredError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("Session store error: {0}")]
    Store(String),

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("Google integration error: {0}")]
    Google(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for MaitredError {
    fn from(err: toml::de::Error) -> Self {
        MaitredError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MaitredError {
    fn from(err: toml::ser::Error) -> Self {
        MaitredError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MaitredError {
    fn from(err: serde_json::Error) -> Self {
        MaitredError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for maitred operations.
pub type Result<T> = std::result::Result<T, MaitredError>;
