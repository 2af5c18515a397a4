//! `derrick-store` — the scoped data accessor.
//!
//! Storage access is split in two layers:
//!
//! - [`RecordStore`]: the raw row-store boundary (select/insert/update/delete
//!   with equality predicates), implemented in memory and on Postgres. Every
//!   operation takes the tenant id; there is no unscoped entry point.
//! - [`ScopedAccessor`]: the typed accessor handed to request handlers. It is
//!   constructed with the authoritative tenant id from the isolation guard and
//!   stamps/filters every operation with it, so call sites cannot forget.
//!
//! Profile storage ([`derrick_auth::ProfileStore`]) is implemented by the same
//! backends.

pub mod accessor;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use accessor::ScopedAccessor;
pub use error::StoreError;
pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use store::{ListOptions, RecordStore};
