//! `derrick-core` — shared foundation for the Derrick operations backend.
//!
//! This crate contains **pure** primitives (identifiers and the domain error
//! model) with no HTTP, storage, or provider concerns.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{IdentityId, RecordId, TenantId};
