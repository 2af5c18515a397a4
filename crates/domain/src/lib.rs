//! `derrick-domain` — the domain record catalogue.
//!
//! Wells, production, revenue, expenses, owners, distributions, maintenance,
//! and companies. All records share one contract ([`DomainRecord`]): a row id,
//! a required owning tenant id, and payload validation. Business data is
//! deliberately plain CRUD rows; no IO lives here.

pub mod collection;
pub mod company;
pub mod distribution;
pub mod expense;
pub mod maintenance;
pub mod owner;
pub mod production;
pub mod record;
pub mod revenue;
pub mod well;

pub use collection::Collection;
pub use company::Company;
pub use distribution::Distribution;
pub use expense::Expense;
pub use maintenance::{MaintenanceKind, MaintenanceRecord};
pub use owner::Owner;
pub use production::ProductionEntry;
pub use record::{DomainRecord, validate_period};
pub use revenue::{ProductKind, RevenueEntry};
pub use well::{Well, WellStatus};
