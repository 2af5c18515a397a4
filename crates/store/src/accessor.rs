//! The typed, tenant-stamped accessor handed to request handlers.

use std::sync::Arc;

use futures_util::future::try_join_all;
use serde_json::Value;

use derrick_core::{RecordId, TenantId};
use derrick_domain::{Collection, DomainRecord};

use crate::error::StoreError;
use crate::store::{ListOptions, RecordStore};

/// Executes reads and writes against domain collections, always constrained
/// by the authoritative tenant id it was constructed with.
///
/// Construct one per request, after the isolation guard has produced the
/// authoritative tenant id. The tenant filter is applied here, not left to
/// each call site to remember.
#[derive(Clone)]
pub struct ScopedAccessor {
    store: Arc<dyn RecordStore>,
    tenant_id: TenantId,
}

impl ScopedAccessor {
    pub fn new(store: Arc<dyn RecordStore>, tenant_id: TenantId) -> Self {
        Self { store, tenant_id }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub async fn list<R: DomainRecord>(&self, opts: &ListOptions) -> Result<Vec<R>, StoreError> {
        let rows = self.store.list(R::COLLECTION, self.tenant_id, opts).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| StoreError::Decode(e.to_string())))
            .collect()
    }

    pub async fn get<R: DomainRecord>(&self, id: RecordId) -> Result<Option<R>, StoreError> {
        let row = self.store.get(R::COLLECTION, self.tenant_id, id).await?;
        row.map(|row| serde_json::from_value(row).map_err(|e| StoreError::Decode(e.to_string())))
            .transpose()
    }

    /// Store a new record. The tenant id is stamped from the accessor's
    /// authoritative id regardless of what the payload carried, and the
    /// record id is freshly assigned so a payload-supplied id can never
    /// collide with (and thereby reveal) another tenant's row.
    pub async fn create<R: DomainRecord>(&self, mut record: R) -> Result<R, StoreError> {
        record.stamp_tenant(self.tenant_id);
        record.stamp_id(RecordId::new());
        let row = serde_json::to_value(&record).map_err(|e| StoreError::Decode(e.to_string()))?;
        self.store
            .insert(R::COLLECTION, self.tenant_id, record.id(), row)
            .await?;
        Ok(record)
    }

    /// Merge a patch into an existing record of this tenant. A record id that
    /// belongs to another tenant behaves exactly like a nonexistent one.
    pub async fn update<R: DomainRecord>(
        &self,
        id: RecordId,
        patch: Value,
    ) -> Result<R, StoreError> {
        let row = self
            .store
            .update(R::COLLECTION, self.tenant_id, id, patch)
            .await?;
        serde_json::from_value(row).map_err(|e| StoreError::Decode(e.to_string()))
    }

    pub async fn delete(&self, collection: Collection, id: RecordId) -> Result<(), StoreError> {
        self.store.delete(collection, self.tenant_id, id).await
    }

    /// Row counts for several collections at once.
    ///
    /// The reads are independent and read-only, so they are issued
    /// concurrently; the aggregate fails as a whole if any of them fails.
    pub async fn counts(
        &self,
        collections: &[Collection],
    ) -> Result<Vec<(Collection, u64)>, StoreError> {
        try_join_all(collections.iter().map(|c| {
            let collection = *c;
            async move {
                let n = self.store.count(collection, self.tenant_id).await?;
                Ok::<_, StoreError>((collection, n))
            }
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use derrick_domain::{Well, WellStatus};
    use serde_json::json;

    fn well(name: &str) -> Well {
        serde_json::from_value(json!({ "name": name })).unwrap()
    }

    fn accessor(store: &Arc<InMemoryStore>, tenant_id: TenantId) -> ScopedAccessor {
        ScopedAccessor::new(store.clone() as Arc<dyn RecordStore>, tenant_id)
    }

    #[tokio::test]
    async fn create_stamps_authoritative_tenant() {
        let store = Arc::new(InMemoryStore::new());
        let t1 = TenantId::new();
        let t2 = TenantId::new();

        // Payload claims a different tenant; the stored row must not.
        let mut tampered = well("Smith #1");
        tampered.company_id = t2;

        let stored = accessor(&store, t1).create(tampered).await.unwrap();
        assert_eq!(stored.company_id, t1);

        let listed: Vec<Well> = accessor(&store, t1)
            .list(&ListOptions::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].company_id, t1);
    }

    #[tokio::test]
    async fn create_assigns_a_fresh_id() {
        let store = Arc::new(InMemoryStore::new());
        let t1 = TenantId::new();
        let t2 = TenantId::new();

        let theirs = accessor(&store, t2).create(well("Jones #4")).await.unwrap();

        // Reusing an existing (foreign) id must neither fail nor collide;
        // the stored row gets its own id.
        let mut reused = well("Smith #1");
        reused.id = theirs.id;
        let stored = accessor(&store, t1).create(reused).await.unwrap();
        assert_ne!(stored.id, theirs.id);

        let untouched: Well = accessor(&store, t2).get(theirs.id).await.unwrap().unwrap();
        assert_eq!(untouched.name, "Jones #4");
    }

    #[tokio::test]
    async fn list_never_returns_foreign_rows() {
        let store = Arc::new(InMemoryStore::new());
        let t1 = TenantId::new();
        let t2 = TenantId::new();

        accessor(&store, t1).create(well("Smith #1")).await.unwrap();
        accessor(&store, t2).create(well("Jones #4")).await.unwrap();

        let mine: Vec<Well> = accessor(&store, t1)
            .list(&ListOptions::default())
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert!(mine.iter().all(|w| w.company_id == t1));
    }

    #[tokio::test]
    async fn foreign_update_and_delete_are_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let t1 = TenantId::new();
        let t2 = TenantId::new();

        let theirs = accessor(&store, t2).create(well("Jones #4")).await.unwrap();
        let mine = accessor(&store, t1);

        let update_err = mine
            .update::<Well>(theirs.id, json!({ "name": "Hijacked" }))
            .await
            .unwrap_err();
        assert_eq!(update_err, StoreError::NotFound);

        let delete_err = mine
            .delete(Collection::Wells, theirs.id)
            .await
            .unwrap_err();
        assert_eq!(delete_err, StoreError::NotFound);

        // Same outcome as a genuinely nonexistent id.
        let ghost = RecordId::new();
        assert_eq!(
            mine.update::<Well>(ghost, json!({ "name": "x" })).await.unwrap_err(),
            StoreError::NotFound
        );
        assert_eq!(
            mine.delete(Collection::Wells, ghost).await.unwrap_err(),
            StoreError::NotFound
        );
    }

    #[tokio::test]
    async fn patch_cannot_move_record_between_tenants() {
        let store = Arc::new(InMemoryStore::new());
        let t1 = TenantId::new();
        let t2 = TenantId::new();

        let created = accessor(&store, t1).create(well("Smith #1")).await.unwrap();
        let patched: Well = accessor(&store, t1)
            .update(
                created.id,
                json!({ "company_id": t2, "status": "shut_in" }),
            )
            .await
            .unwrap();

        assert_eq!(patched.company_id, t1);
        assert_eq!(patched.status, WellStatus::ShutIn);
    }

    #[tokio::test]
    async fn counts_cover_requested_collections() {
        let store = Arc::new(InMemoryStore::new());
        let t1 = TenantId::new();
        let scoped = accessor(&store, t1);

        scoped.create(well("Smith #1")).await.unwrap();
        scoped.create(well("Smith #2")).await.unwrap();

        let counts = scoped
            .counts(&[Collection::Wells, Collection::Owners])
            .await
            .unwrap();
        assert_eq!(counts, vec![(Collection::Wells, 2), (Collection::Owners, 0)]);
    }
}
