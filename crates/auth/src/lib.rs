//! `derrick-auth` — the tenant-scoped request authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. It covers the
//! four stages every request passes through:
//!
//! 1. session resolution (credential -> [`Identity`], or `Unauthenticated`)
//! 2. tenant resolution ([`Identity`] -> [`Profile`] + tenant, or `NeedsSetup`)
//! 3. the isolation guard (claimed vs resolved tenant)
//! 4. handing an authoritative [`TenantId`] to the data layer
//!
//! Storage is reached only through the [`ProfileStore`] trait; HTTP wiring
//! lives in `derrick-api`.

pub mod error;
pub mod guard;
pub mod identity;
pub mod profile;
pub mod resolve;
pub mod session;

pub use error::AccessError;
pub use guard::enforce_isolation;
pub use identity::{Identity, SessionClaims, validate_claims};
pub use profile::{Profile, Role};
pub use resolve::{ProfileStore, TenantResolution, resolve_tenant};
pub use session::{Hs256SessionVerifier, SessionVerifier, credential_fingerprint};

pub use derrick_core::{IdentityId, TenantId};
