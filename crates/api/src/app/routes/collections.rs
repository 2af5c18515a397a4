//! Generic CRUD handlers, instantiated once per domain collection.
//!
//! Every handler reads the authoritative tenant from the `TenantContext`
//! request extension and goes through a [`ScopedAccessor`], so there is no
//! way to reach storage without the tenant filter applied.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::Value;

use derrick_auth::AccessError;
use derrick_core::RecordId;
use derrick_domain::DomainRecord;
use derrick_store::ListOptions;

use crate::app::dto::{collection_body, merged_record};
use crate::app::errors::{access_error_response, json_error, store_error_response};
use crate::app::services::AppServices;
use crate::authz::role_may_write;
use crate::context::{CallerContext, TenantContext};

pub fn routes<R: DomainRecord>() -> Router {
    Router::new()
        .route("/", get(list::<R>).post(create::<R>))
        .route("/:id", axum::routing::patch(update::<R>).delete(remove::<R>))
}

/// Query-string handling for list: `sort` and `order` steer ordering, every
/// other key becomes an equality filter on the named payload field.
fn list_options(params: &HashMap<String, String>) -> ListOptions {
    let mut opts = ListOptions::default();
    let descending = params
        .get("order")
        .is_some_and(|o| o.eq_ignore_ascii_case("desc"));
    if let Some(field) = params.get("sort") {
        opts = opts.order_by(field.clone(), descending);
    }
    for (field, value) in params {
        if field == "sort" || field == "order" {
            continue;
        }
        opts = opts.eq(field.clone(), value.clone());
    }
    opts
}

async fn list<R: DomainRecord>(
    Extension(tenant): Extension<TenantContext>,
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let accessor = services.scoped(tenant.tenant_id());
    match accessor.list::<R>(&list_options(&params)).await {
        Ok(rows) => match collection_body(&rows) {
            Ok(body) => Json(body).into_response(),
            Err(err) => access_error_response(&err),
        },
        Err(err) => store_error_response(err),
    }
}

async fn create<R: DomainRecord>(
    Extension(caller): Extension<CallerContext>,
    Extension(tenant): Extension<TenantContext>,
    Extension(services): Extension<Arc<AppServices>>,
    Json(record): Json<R>,
) -> Response {
    if let Err(resp) = check_write::<R>(&caller) {
        return resp;
    }
    // Validate before touching storage; the accessor stamps the tenant, so a
    // tenant id carried in the payload never reaches the row.
    if let Err(err) = record.validate() {
        return access_error_response(&AccessError::validation(err.to_string()));
    }
    let accessor = services.scoped(tenant.tenant_id());
    match accessor.create(record).await {
        Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
        Err(err) => store_error_response(err),
    }
}

async fn update<R: DomainRecord>(
    Extension(caller): Extension<CallerContext>,
    Extension(tenant): Extension<TenantContext>,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Response {
    if let Err(resp) = check_write::<R>(&caller) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let accessor = services.scoped(tenant.tenant_id());

    // Fetch-merge-validate before the write so an invalid patch leaves the
    // row untouched. A foreign-tenant id reads as absent here, which keeps
    // the response identical to a nonexistent id.
    let current: R = match accessor.get(id).await {
        Ok(Some(row)) => row,
        Ok(None) => return json_error(StatusCode::NOT_FOUND, "not_found", "record not found"),
        Err(err) => return store_error_response(err),
    };
    let preview = match merged_record(&current, &patch) {
        Ok(preview) => preview,
        Err(err) => return access_error_response(&err),
    };
    if let Err(err) = preview.validate() {
        return access_error_response(&AccessError::validation(err.to_string()));
    }

    match accessor.update::<R>(id, patch).await {
        Ok(stored) => Json(stored).into_response(),
        Err(err) => store_error_response(err),
    }
}

async fn remove<R: DomainRecord>(
    Extension(caller): Extension<CallerContext>,
    Extension(tenant): Extension<TenantContext>,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = check_write::<R>(&caller) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let accessor = services.scoped(tenant.tenant_id());
    match accessor.delete(R::COLLECTION, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => store_error_response(err),
    }
}

fn check_write<R: DomainRecord>(caller: &CallerContext) -> Result<(), Response> {
    let allowed = caller
        .role()
        .is_some_and(|role| role_may_write(role, R::COLLECTION));
    if allowed {
        Ok(())
    } else {
        Err(json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            format!("role may not write to {}", R::COLLECTION.key()),
        ))
    }
}

fn parse_id(raw: &str) -> Result<RecordId, Response> {
    raw.parse().map_err(|_| {
        json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "record id must be a uuid",
        )
    })
}
