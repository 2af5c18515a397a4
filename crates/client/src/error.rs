use thiserror::Error;

/// What the UI should do about a failed fetch.
///
/// These three are distinct on purpose: they require different user actions
/// (login page, setup flow, retry affordance) and must not be merged into a
/// single generic error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    SignIn,
    CompleteSetup,
    Retry,
}

/// Client-side fetch failure, after the retry budget is spent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// 401: credentials missing or stale.
    #[error("not authenticated")]
    Unauthenticated,

    /// The server signalled `needs_setup`.
    #[error("account setup incomplete")]
    NeedsSetup,

    /// Any other 4xx; terminal, never retried.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// 5xx after all attempts.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Transport failure after all attempts.
    #[error("network failure: {0}")]
    Network(String),

    /// A single attempt exceeded the request timeout (after all attempts).
    #[error("request timed out")]
    Timeout,

    /// Superseded by a newer fetch for the same resource.
    #[error("superseded by a newer request")]
    Cancelled,
}

impl FetchError {
    pub fn user_action(&self) -> UserAction {
        match self {
            FetchError::Unauthenticated => UserAction::SignIn,
            FetchError::NeedsSetup => UserAction::CompleteSetup,
            FetchError::Rejected { .. }
            | FetchError::Server { .. }
            | FetchError::Network(_)
            | FetchError::Timeout
            | FetchError::Cancelled => UserAction::Retry,
        }
    }

    /// Whether another attempt may help. Authorization and validation
    /// failures are terminal; only transport and server-side failures retry.
    pub(crate) fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Server { .. } | FetchError::Network(_) | FetchError::Timeout
        )
    }
}
