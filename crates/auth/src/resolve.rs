//! Tenant resolution: [`Identity`] -> [`Profile`] + tenant.

use async_trait::async_trait;

use derrick_core::{IdentityId, TenantId};

use crate::error::AccessError;
use crate::identity::Identity;
use crate::profile::{Profile, Role};

/// Storage boundary for profiles.
///
/// Implementations convert their backend errors into [`AccessError::Storage`]
/// with caller-safe messages; no backend error type crosses this trait.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Look up the profile for an identity, if one exists.
    async fn profile(&self, identity_id: IdentityId) -> Result<Option<Profile>, AccessError>;

    /// Idempotently create the minimal profile row for an identity.
    ///
    /// First-writer-wins on the identity-keyed row; last-writer-wins on
    /// non-key fields (display name). Safe to race from concurrent requests.
    async fn ensure_profile(
        &self,
        identity: &Identity,
        display_name: &str,
    ) -> Result<Profile, AccessError>;

    /// Attach a tenant to a profile whose tenant is still null.
    ///
    /// Assigning the same tenant again is a no-op; re-pointing to a different
    /// tenant is a validation error (the tenant id is set once).
    async fn assign_tenant(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
    ) -> Result<Profile, AccessError>;

    /// Change the role on a profile. Caller is responsible for checking that
    /// the actor is an admin of the same tenant.
    async fn set_role(&self, identity_id: IdentityId, role: Role) -> Result<Profile, AccessError>;
}

/// Outcome of tenant resolution for an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantResolution {
    /// No profile row, or a profile whose tenant is still null. The caller is
    /// routed to the setup flow; this is distinct from `Unauthenticated`.
    NeedsSetup { profile: Option<Profile> },

    /// The identity belongs to exactly one tenant.
    Resolved { profile: Profile, tenant_id: TenantId },
}

/// Map an identity to its owning tenant.
///
/// A missing profile does **not** fail the request: it yields
/// [`TenantResolution::NeedsSetup`] so the caller can be routed to the
/// tenant-creation flow. Only storage failures are errors here.
pub async fn resolve_tenant<S>(
    store: &S,
    identity_id: IdentityId,
) -> Result<TenantResolution, AccessError>
where
    S: ProfileStore + ?Sized,
{
    let Some(profile) = store.profile(identity_id).await? else {
        return Ok(TenantResolution::NeedsSetup { profile: None });
    };

    match profile.tenant_id {
        Some(tenant_id) => Ok(TenantResolution::Resolved { profile, tenant_id }),
        None => Ok(TenantResolution::NeedsSetup {
            profile: Some(profile),
        }),
    }
}
