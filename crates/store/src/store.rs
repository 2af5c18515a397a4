use async_trait::async_trait;
use serde_json::Value;

use derrick_core::{RecordId, TenantId};
use derrick_domain::Collection;

use crate::error::StoreError;

/// List parameters: equality filters and a single sort key.
///
/// Filters apply to payload fields; the tenant filter is **not** expressible
/// here, it is a mandatory argument on every [`RecordStore`] call.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub eq: Vec<(String, String)>,
    pub order_by: Option<String>,
    pub descending: bool,
}

impl ListOptions {
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.eq.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.order_by = Some(field.into());
        self.descending = descending;
        self
    }
}

/// The row-store boundary: per-collection rows with equality predicates.
///
/// # Tenant isolation
/// Every method takes `tenant_id` and implementations must constrain by it in
/// the query predicate itself (not post-filter in application code for the
/// Postgres case). `update`/`delete` of a row belonging to another tenant
/// return [`StoreError::NotFound`] exactly like a nonexistent id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list(
        &self,
        collection: Collection,
        tenant_id: TenantId,
        opts: &ListOptions,
    ) -> Result<Vec<Value>, StoreError>;

    async fn get(
        &self,
        collection: Collection,
        tenant_id: TenantId,
        id: RecordId,
    ) -> Result<Option<Value>, StoreError>;

    async fn insert(
        &self,
        collection: Collection,
        tenant_id: TenantId,
        id: RecordId,
        row: Value,
    ) -> Result<(), StoreError>;

    /// Merge `patch`'s top-level fields into the stored row and return the
    /// updated row. `id` and `company_id` are never patched.
    async fn update(
        &self,
        collection: Collection,
        tenant_id: TenantId,
        id: RecordId,
        patch: Value,
    ) -> Result<Value, StoreError>;

    async fn delete(
        &self,
        collection: Collection,
        tenant_id: TenantId,
        id: RecordId,
    ) -> Result<(), StoreError>;

    /// Count rows in a collection for a tenant.
    async fn count(
        &self,
        collection: Collection,
        tenant_id: TenantId,
    ) -> Result<u64, StoreError>;
}

/// Fields that identify a row and are never writable through a patch.
pub(crate) const PROTECTED_FIELDS: [&str; 2] = ["id", "company_id"];


/// Drop identity/ownership fields from a patch before it is merged.
pub(crate) fn sanitize_patch(patch: Value) -> Result<Value, StoreError> {
    match patch {
        Value::Object(mut map) => {
            for field in PROTECTED_FIELDS {
                map.remove(field);
            }
            Ok(Value::Object(map))
        }
        _ => Err(StoreError::Decode("patch must be a JSON object".to_string())),
    }
}

/// Loose equality between a JSON payload field and a query-string value.
pub(crate) fn json_field_matches(row: &Value, field: &str, needle: &str) -> bool {
    match row.get(field) {
        Some(Value::String(s)) => s == needle,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == needle,
    }
}

/// Ordering between two JSON values of the same payload field.
pub(crate) fn json_value_cmp(a: &Value, b: &Value) -> core::cmp::Ordering {
    use core::cmp::Ordering;
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}
