//! Postgres backend (sqlx).
//!
//! ## Tenant isolation
//! Every statement carries `tenant_id` in its predicate; cross-tenant access
//! is impossible at the SQL level, not just filtered in application code.
//!
//! ## Timeouts
//! Each single statement is bounded by `op_timeout`; on expiry the operation
//! surfaces as a timeout error and is not retried.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use derrick_auth::{AccessError, Identity, Profile, ProfileStore, Role};
use derrick_core::{IdentityId, RecordId, TenantId};
use derrick_domain::Collection;

use crate::error::StoreError;
use crate::store::{ListOptions, RecordStore, sanitize_patch};

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS domain_records (
    id uuid PRIMARY KEY,
    collection text NOT NULL,
    tenant_id uuid NOT NULL,
    payload jsonb NOT NULL,
    created_at timestamptz NOT NULL DEFAULT now()
);
CREATE INDEX IF NOT EXISTS domain_records_tenant_idx
    ON domain_records (collection, tenant_id);

CREATE TABLE IF NOT EXISTS profiles (
    identity_id uuid PRIMARY KEY,
    display_name text NOT NULL,
    role text NOT NULL,
    tenant_id uuid,
    created_at timestamptz NOT NULL DEFAULT now()
);
"#;

/// Postgres-backed row store and profile store.
pub struct PgStore {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    /// Create tables and indexes if they do not exist.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(StoreError::backend)?;
        }
        Ok(())
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(StoreError::backend),
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn list(
        &self,
        collection: Collection,
        tenant_id: TenantId,
        opts: &ListOptions,
    ) -> Result<Vec<Value>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT payload FROM domain_records WHERE collection = ");
        qb.push_bind(collection.key());
        qb.push(" AND tenant_id = ");
        qb.push_bind(*tenant_id.as_uuid());

        for (field, value) in &opts.eq {
            qb.push(" AND payload ->> ");
            qb.push_bind(field.as_str());
            qb.push(" = ");
            qb.push_bind(value.as_str());
        }

        if let Some(field) = &opts.order_by {
            qb.push(" ORDER BY payload ->> ");
            qb.push_bind(field.as_str());
            if opts.descending {
                qb.push(" DESC");
            }
        }

        let rows = self
            .bounded(qb.build().fetch_all(&self.pool))
            .await?;
        rows.iter()
            .map(|row| {
                row.try_get::<Value, _>("payload")
                    .map_err(|e| StoreError::Decode(e.to_string()))
            })
            .collect()
    }

    async fn get(
        &self,
        collection: Collection,
        tenant_id: TenantId,
        id: RecordId,
    ) -> Result<Option<Value>, StoreError> {
        let row = self
            .bounded(
                sqlx::query(
                    "SELECT payload FROM domain_records \
                     WHERE id = $1 AND collection = $2 AND tenant_id = $3",
                )
                .bind(*id.as_uuid())
                .bind(collection.key())
                .bind(*tenant_id.as_uuid())
                .fetch_optional(&self.pool),
            )
            .await?;

        row.map(|row| {
            row.try_get::<Value, _>("payload")
                .map_err(|e| StoreError::Decode(e.to_string()))
        })
        .transpose()
    }

    async fn insert(
        &self,
        collection: Collection,
        tenant_id: TenantId,
        id: RecordId,
        row: Value,
    ) -> Result<(), StoreError> {
        self.bounded(
            sqlx::query(
                "INSERT INTO domain_records (id, collection, tenant_id, payload) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(*id.as_uuid())
            .bind(collection.key())
            .bind(*tenant_id.as_uuid())
            .bind(row)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        tenant_id: TenantId,
        id: RecordId,
        patch: Value,
    ) -> Result<Value, StoreError> {
        let patch = sanitize_patch(patch)?;

        // jsonb concatenation merges top-level fields; the tenant predicate
        // makes a foreign-tenant id indistinguishable from an absent one.
        let row = self
            .bounded(
                sqlx::query(
                    "UPDATE domain_records SET payload = payload || $4 \
                     WHERE id = $1 AND collection = $2 AND tenant_id = $3 \
                     RETURNING payload",
                )
                .bind(*id.as_uuid())
                .bind(collection.key())
                .bind(*tenant_id.as_uuid())
                .bind(patch)
                .fetch_optional(&self.pool),
            )
            .await?
            .ok_or(StoreError::NotFound)?;

        row.try_get::<Value, _>("payload")
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn delete(
        &self,
        collection: Collection,
        tenant_id: TenantId,
        id: RecordId,
    ) -> Result<(), StoreError> {
        let result = self
            .bounded(
                sqlx::query(
                    "DELETE FROM domain_records \
                     WHERE id = $1 AND collection = $2 AND tenant_id = $3",
                )
                .bind(*id.as_uuid())
                .bind(collection.key())
                .bind(*tenant_id.as_uuid())
                .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count(
        &self,
        collection: Collection,
        tenant_id: TenantId,
    ) -> Result<u64, StoreError> {
        let row = self
            .bounded(
                sqlx::query(
                    "SELECT count(*) AS n FROM domain_records \
                     WHERE collection = $1 AND tenant_id = $2",
                )
                .bind(collection.key())
                .bind(*tenant_id.as_uuid())
                .fetch_one(&self.pool),
            )
            .await?;

        let n: i64 = row
            .try_get("n")
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(n as u64)
    }
}

fn profile_from_row(row: &PgRow) -> Result<Profile, AccessError> {
    let corrupt = |_| AccessError::storage("corrupt profile row");

    let identity_id: Uuid = row.try_get("identity_id").map_err(corrupt)?;
    let display_name: String = row.try_get("display_name").map_err(corrupt)?;
    let role: String = row.try_get("role").map_err(corrupt)?;
    let tenant_id: Option<Uuid> = row.try_get("tenant_id").map_err(corrupt)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(corrupt)?;

    Ok(Profile {
        identity_id: IdentityId::from_uuid(identity_id),
        display_name,
        role: role
            .parse::<Role>()
            .map_err(|_| AccessError::storage("corrupt profile row"))?,
        tenant_id: tenant_id.map(TenantId::from_uuid),
        created_at,
    })
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn profile(&self, identity_id: IdentityId) -> Result<Option<Profile>, AccessError> {
        let row = self
            .bounded(
                sqlx::query(
                    "SELECT identity_id, display_name, role, tenant_id, created_at \
                     FROM profiles WHERE identity_id = $1",
                )
                .bind(*identity_id.as_uuid())
                .fetch_optional(&self.pool),
            )
            .await
            .map_err(AccessError::from)?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn ensure_profile(
        &self,
        identity: &Identity,
        display_name: &str,
    ) -> Result<Profile, AccessError> {
        // First-writer-wins on the identity-keyed row (role, tenant, created_at
        // survive); last-writer-wins on the display name.
        let row = self
            .bounded(
                sqlx::query(
                    "INSERT INTO profiles (identity_id, display_name, role, tenant_id) \
                     VALUES ($1, $2, $3, NULL) \
                     ON CONFLICT (identity_id) \
                     DO UPDATE SET display_name = EXCLUDED.display_name \
                     RETURNING identity_id, display_name, role, tenant_id, created_at",
                )
                .bind(*identity.id.as_uuid())
                .bind(display_name)
                .bind(Role::Viewer.as_str())
                .fetch_one(&self.pool),
            )
            .await
            .map_err(AccessError::from)?;

        profile_from_row(&row)
    }

    async fn assign_tenant(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
    ) -> Result<Profile, AccessError> {
        let row = self
            .bounded(
                sqlx::query(
                    "UPDATE profiles SET tenant_id = $2 \
                     WHERE identity_id = $1 AND (tenant_id IS NULL OR tenant_id = $2) \
                     RETURNING identity_id, display_name, role, tenant_id, created_at",
                )
                .bind(*identity_id.as_uuid())
                .bind(*tenant_id.as_uuid())
                .fetch_optional(&self.pool),
            )
            .await
            .map_err(AccessError::from)?;

        match row {
            Some(row) => profile_from_row(&row),
            // Distinguish "no profile" from "already on another tenant".
            None => match self.profile(identity_id).await? {
                None => Err(AccessError::NeedsSetup),
                Some(_) => Err(AccessError::validation(
                    "profile already belongs to a tenant",
                )),
            },
        }
    }

    async fn set_role(&self, identity_id: IdentityId, role: Role) -> Result<Profile, AccessError> {
        let row = self
            .bounded(
                sqlx::query(
                    "UPDATE profiles SET role = $2 WHERE identity_id = $1 \
                     RETURNING identity_id, display_name, role, tenant_id, created_at",
                )
                .bind(*identity_id.as_uuid())
                .bind(role.as_str())
                .fetch_optional(&self.pool),
            )
            .await
            .map_err(AccessError::from)?;

        match row {
            Some(row) => profile_from_row(&row),
            None => Err(AccessError::NeedsSetup),
        }
    }
}
