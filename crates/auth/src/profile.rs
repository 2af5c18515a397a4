use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use derrick_core::{IdentityId, TenantId};

/// Application role within a tenant.
///
/// Role changes are admin-only and tenant-scoped; the role-to-permission
/// mapping lives with the HTTP layer, which knows the collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Accountant,
    Operator,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Accountant => "accountant",
            Role::Operator => "operator",
            Role::Viewer => "viewer",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "accountant" => Ok(Role::Accountant),
            "operator" => Ok(Role::Operator),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// This application's 1:1 extension of an [`crate::Identity`].
///
/// # Invariants
/// - `identity_id` is the primary key; at most one profile per identity.
/// - A profile with a non-null `tenant_id` belongs to exactly one tenant, and
///   `tenant_id` is set once (during setup) and never re-pointed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub identity_id: IdentityId,
    pub display_name: String,
    pub role: Role,
    /// Null until the identity completes tenant setup.
    pub tenant_id: Option<TenantId>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Minimal profile created on the first-login convenience path.
    pub fn minimal(identity_id: IdentityId, display_name: impl Into<String>) -> Self {
        Self {
            identity_id,
            display_name: display_name.into(),
            role: Role::Viewer,
            tenant_id: None,
            created_at: Utc::now(),
        }
    }
}
