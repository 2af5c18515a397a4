use std::sync::Arc;

use derrick_auth::ProfileStore;
use derrick_core::TenantId;
use derrick_store::{InMemoryStore, PgStore, RecordStore, ScopedAccessor};

/// The storage handles the HTTP layer works through.
///
/// Constructed once at startup and passed through the router as request
/// state; per-request scoped accessors are derived from it after the
/// isolation guard has produced the authoritative tenant id. There is no
/// module-level global client.
pub struct AppServices {
    records: Arc<dyn RecordStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl AppServices {
    /// In-memory wiring (dev/test). Also returns the concrete store so tests
    /// can observe storage-operation counts.
    pub fn in_memory() -> (Arc<Self>, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let services = Arc::new(Self {
            records: store.clone(),
            profiles: store.clone(),
        });
        (services, store)
    }

    /// Postgres wiring.
    pub fn postgres(store: Arc<PgStore>) -> Arc<Self> {
        Arc::new(Self {
            records: store.clone(),
            profiles: store,
        })
    }

    /// Tenant-scoped accessor for one request.
    pub fn scoped(&self, tenant_id: TenantId) -> ScopedAccessor {
        ScopedAccessor::new(self.records.clone(), tenant_id)
    }

    pub fn profile_store(&self) -> Arc<dyn ProfileStore> {
        self.profiles.clone()
    }
}
