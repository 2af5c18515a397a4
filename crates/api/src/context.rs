use derrick_auth::{Identity, Profile, Role, TenantResolution};
use derrick_core::TenantId;

/// Authoritative tenant context for a request.
///
/// Inserted by the tenant middleware only after the isolation guard has run;
/// its presence means the request is fully authorized for this tenant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Authenticated caller for a request: identity plus tenant resolution.
///
/// Present on every `/api` route, including the setup flow (where the
/// resolution is still `NeedsSetup`).
#[derive(Debug, Clone)]
pub struct CallerContext {
    identity: Identity,
    resolution: TenantResolution,
}

impl CallerContext {
    pub fn new(identity: Identity, resolution: TenantResolution) -> Self {
        Self { identity, resolution }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn resolution(&self) -> &TenantResolution {
        &self.resolution
    }

    pub fn profile(&self) -> Option<&Profile> {
        match &self.resolution {
            TenantResolution::Resolved { profile, .. } => Some(profile),
            TenantResolution::NeedsSetup { profile } => profile.as_ref(),
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.profile().map(|p| p.role)
    }
}
