use thiserror::Error;

/// The access-control error taxonomy.
///
/// Every failure on the authorization path is converted into exactly one of
/// these kinds at the boundary where it occurs (provider errors in the session
/// verifier, storage errors in the store implementations). Downstream code
/// matches on the variant, never on provider-specific message text.
///
/// All five are terminal for the request; none is retried server-side.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Credentials missing, expired, or invalid.
    #[error("not authenticated")]
    Unauthenticated,

    /// Authenticated, but no profile or no tenant yet; route to setup.
    #[error("account setup incomplete")]
    NeedsSetup,

    /// A caller-claimed tenant id disagreed with the session-resolved one.
    #[error("tenant isolation violation")]
    IsolationViolation,

    /// Underlying storage failed. The message is caller-safe.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Malformed payload or missing required field; rejected before storage.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl AccessError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stable machine-readable code, used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::NeedsSetup => "needs_setup",
            Self::IsolationViolation => "isolation_violation",
            Self::Storage(_) => "storage_error",
            Self::Validation(_) => "validation_error",
        }
    }
}
