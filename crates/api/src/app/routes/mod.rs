use axum::Router;

use derrick_domain::{
    Company, Distribution, Expense, MaintenanceRecord, Owner, ProductionEntry, RevenueEntry, Well,
};

pub mod collections;
pub mod session;
pub mod system;

/// The tenant-scoped data surface. Every route here runs behind the
/// authentication and isolation-guard middlewares; companies get no special
/// handler because tenant scoping already reduces the listing to the caller's
/// own company row.
pub fn data_router() -> Router {
    Router::new()
        .nest("/wells", collections::routes::<Well>())
        .nest("/production", collections::routes::<ProductionEntry>())
        .nest("/revenue", collections::routes::<RevenueEntry>())
        .nest("/expenses", collections::routes::<Expense>())
        .nest("/owners", collections::routes::<Owner>())
        .nest("/distributions", collections::routes::<Distribution>())
        .nest("/maintenance", collections::routes::<MaintenanceRecord>())
        .nest("/companies", collections::routes::<Company>())
}
