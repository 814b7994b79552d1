use maitred_core::MaitredError;

/// Errors from the session store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt session record: {0}")]
    Corrupt(String),
    #[error("store lock poisoned")]
    LockPoisoned,
}

impl From<StoreError> for MaitredError {
    fn from(err: StoreError) -> Self {
        MaitredError::Store(err.to_string())
    }
}
