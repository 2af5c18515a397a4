use thiserror::Error;

use derrick_auth::AccessError;

/// Storage-layer error.
///
/// `NotFound` covers both "no such record" and "record belongs to another
/// tenant": the two must be indistinguishable to callers to avoid leaking
/// cross-tenant existence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("storage operation timed out")]
    Timeout,

    #[error("row could not be decoded")]
    Decode(String),

    /// Backend failure. The message is logged, not returned to callers.
    #[error("storage backend failure")]
    Backend(String),
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<StoreError> for AccessError {
    fn from(err: StoreError) -> Self {
        match err {
            // NotFound is handled at the HTTP layer as a 404, but if it
            // escapes this far it is still a safe message.
            StoreError::NotFound => AccessError::storage("record not found"),
            StoreError::Timeout => AccessError::storage("storage operation timed out"),
            StoreError::Decode(_) => AccessError::storage("stored row could not be decoded"),
            StoreError::Backend(msg) => {
                tracing::error!("storage backend failure: {msg}");
                AccessError::storage("storage backend failure")
            }
        }
    }
}
