//! In-memory backend for dev and tests.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use derrick_auth::{AccessError, Identity, Profile, ProfileStore, Role};
use derrick_core::{IdentityId, RecordId, TenantId};
use derrick_domain::Collection;

use crate::error::StoreError;
use crate::store::{
    ListOptions, RecordStore, json_field_matches, json_value_cmp, sanitize_patch,
};

#[derive(Debug, Clone)]
struct StoredRow {
    tenant_id: TenantId,
    payload: Value,
}

/// In-memory row store.
///
/// Tracks the number of domain-record operations performed, which lets tests
/// assert that rejected requests touched storage zero times.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rows: RwLock<HashMap<(Collection, RecordId), StoredRow>>,
    profiles: RwLock<HashMap<IdentityId, Profile>>,
    record_ops: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of domain-record storage operations performed so far.
    /// Profile lookups are not counted; the isolation properties are about
    /// domain collections.
    pub fn record_ops(&self) -> u64 {
        self.record_ops.load(Ordering::Relaxed)
    }

    fn bump(&self) {
        self.record_ops.fetch_add(1, Ordering::Relaxed);
    }

    fn read_rows(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<(Collection, RecordId), StoredRow>>, StoreError>
    {
        self.rows.read().map_err(|_| StoreError::backend("row lock poisoned"))
    }

    fn write_rows(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<(Collection, RecordId), StoredRow>>, StoreError>
    {
        self.rows.write().map_err(|_| StoreError::backend("row lock poisoned"))
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn list(
        &self,
        collection: Collection,
        tenant_id: TenantId,
        opts: &ListOptions,
    ) -> Result<Vec<Value>, StoreError> {
        self.bump();
        let rows = self.read_rows()?;

        let mut out: Vec<Value> = rows
            .iter()
            .filter(|((c, _), row)| *c == collection && row.tenant_id == tenant_id)
            .filter(|(_, row)| {
                opts.eq
                    .iter()
                    .all(|(field, value)| json_field_matches(&row.payload, field, value))
            })
            .map(|(_, row)| row.payload.clone())
            .collect();

        if let Some(field) = &opts.order_by {
            out.sort_by(|a, b| {
                let ord = json_value_cmp(
                    a.get(field).unwrap_or(&Value::Null),
                    b.get(field).unwrap_or(&Value::Null),
                );
                if opts.descending { ord.reverse() } else { ord }
            });
        }

        Ok(out)
    }

    async fn get(
        &self,
        collection: Collection,
        tenant_id: TenantId,
        id: RecordId,
    ) -> Result<Option<Value>, StoreError> {
        self.bump();
        let rows = self.read_rows()?;
        Ok(rows
            .get(&(collection, id))
            .filter(|row| row.tenant_id == tenant_id)
            .map(|row| row.payload.clone()))
    }

    async fn insert(
        &self,
        collection: Collection,
        tenant_id: TenantId,
        id: RecordId,
        row: Value,
    ) -> Result<(), StoreError> {
        self.bump();
        let mut rows = self.write_rows()?;
        if rows.contains_key(&(collection, id)) {
            return Err(StoreError::backend("duplicate record id"));
        }
        rows.insert((collection, id), StoredRow { tenant_id, payload: row });
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        tenant_id: TenantId,
        id: RecordId,
        patch: Value,
    ) -> Result<Value, StoreError> {
        self.bump();
        let patch = sanitize_patch(patch)?;
        let mut rows = self.write_rows()?;

        // Foreign-tenant rows are not-found, identically to absent rows.
        let row = rows
            .get_mut(&(collection, id))
            .filter(|row| row.tenant_id == tenant_id)
            .ok_or(StoreError::NotFound)?;

        if let (Value::Object(target), Value::Object(fields)) = (&mut row.payload, patch) {
            for (k, v) in fields {
                target.insert(k, v);
            }
        }
        Ok(row.payload.clone())
    }

    async fn delete(
        &self,
        collection: Collection,
        tenant_id: TenantId,
        id: RecordId,
    ) -> Result<(), StoreError> {
        self.bump();
        let mut rows = self.write_rows()?;

        match rows.get(&(collection, id)) {
            Some(row) if row.tenant_id == tenant_id => {
                rows.remove(&(collection, id));
                Ok(())
            }
            _ => Err(StoreError::NotFound),
        }
    }

    async fn count(
        &self,
        collection: Collection,
        tenant_id: TenantId,
    ) -> Result<u64, StoreError> {
        self.bump();
        let rows = self.read_rows()?;
        Ok(rows
            .iter()
            .filter(|((c, _), row)| *c == collection && row.tenant_id == tenant_id)
            .count() as u64)
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn profile(&self, identity_id: IdentityId) -> Result<Option<Profile>, AccessError> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| AccessError::storage("profile lock poisoned"))?;
        Ok(profiles.get(&identity_id).cloned())
    }

    async fn ensure_profile(
        &self,
        identity: &Identity,
        display_name: &str,
    ) -> Result<Profile, AccessError> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| AccessError::storage("profile lock poisoned"))?;

        let profile = profiles
            .entry(identity.id)
            .and_modify(|p| {
                // Last-writer-wins on non-key fields only.
                p.display_name = display_name.to_string();
            })
            .or_insert_with(|| Profile::minimal(identity.id, display_name));
        Ok(profile.clone())
    }

    async fn assign_tenant(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
    ) -> Result<Profile, AccessError> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| AccessError::storage("profile lock poisoned"))?;

        let profile = profiles.get_mut(&identity_id).ok_or(AccessError::NeedsSetup)?;
        match profile.tenant_id {
            None => profile.tenant_id = Some(tenant_id),
            Some(existing) if existing == tenant_id => {}
            Some(_) => {
                return Err(AccessError::validation(
                    "profile already belongs to a tenant",
                ));
            }
        }
        Ok(profile.clone())
    }

    async fn set_role(&self, identity_id: IdentityId, role: Role) -> Result<Profile, AccessError> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| AccessError::storage("profile lock poisoned"))?;

        let profile = profiles.get_mut(&identity_id).ok_or(AccessError::NeedsSetup)?;
        profile.role = role;
        Ok(profile.clone())
    }
}
