//! The isolation guard: claimed vs session-resolved tenant.

use derrick_core::TenantId;

use crate::error::AccessError;

/// Verify a caller-claimed tenant id against the session-resolved one and
/// return the authoritative id to use downstream.
///
/// The resolved id always wins. A missing claim defaults to it; a disagreeing
/// claim is a hard error, never silently overridden or accepted. A caller
/// must not be able to widen or redirect its data access via a header value.
///
/// Stateless and pure: no I/O.
pub fn enforce_isolation(
    resolved: TenantId,
    claimed: Option<TenantId>,
) -> Result<TenantId, AccessError> {
    match claimed {
        None => Ok(resolved),
        Some(claim) if claim == resolved => Ok(resolved),
        Some(claim) => {
            tracing::warn!(%resolved, %claim, "tenant isolation violation");
            Err(AccessError::IsolationViolation)
        }
    }
}
