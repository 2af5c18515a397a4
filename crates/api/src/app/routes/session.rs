//! Session summary and first-run tenant setup.
//!
//! These routes sit behind authentication but not behind the isolation
//! guard: a caller in the `NeedsSetup` state must still be able to see
//! their session and create a tenant.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::{Map, Value, json};

use derrick_auth::{AccessError, Role, TenantResolution, resolve_tenant};
use derrick_core::TenantId;
use derrick_domain::{Collection, Company, DomainRecord};

use crate::app::dto::SetupRequest;
use crate::app::errors::access_error_response;
use crate::app::services::AppServices;
use crate::context::CallerContext;

/// GET /api/session: who am I, which tenant, and (when resolved) how many
/// rows each collection holds for that tenant.
pub async fn session_summary(
    Extension(caller): Extension<CallerContext>,
    Extension(services): Extension<Arc<AppServices>>,
) -> Response {
    let identity = caller.identity();
    let mut body = Map::new();
    body.insert(
        "identity".into(),
        json!({ "id": identity.id, "email": identity.email }),
    );

    match caller.resolution() {
        TenantResolution::NeedsSetup { profile } => {
            body.insert("needs_setup".into(), json!(true));
            body.insert("profile".into(), json!(profile));
            body.insert("tenant_id".into(), Value::Null);
        }
        TenantResolution::Resolved { profile, tenant_id } => {
            body.insert("needs_setup".into(), json!(false));
            body.insert("profile".into(), json!(profile));
            body.insert("tenant_id".into(), json!(tenant_id));

            let accessor = services.scoped(*tenant_id);
            match accessor.counts(&Collection::ALL).await {
                Ok(counts) => {
                    let counts: Map<String, Value> = counts
                        .into_iter()
                        .map(|(c, n)| (c.key().to_string(), json!(n)))
                        .collect();
                    body.insert("counts".into(), Value::Object(counts));
                }
                Err(err) => return access_error_response(&AccessError::from(err)),
            }
        }
    }

    Json(Value::Object(body)).into_response()
}

/// POST /api/setup: create a tenant for a caller that has none.
///
/// Idempotent: a caller whose profile already carries a tenant gets a 200
/// with that tenant id and no new rows. Two racing setup requests converge
/// on one tenant; the loser re-reads and reports the winner's.
pub async fn run_setup(
    Extension(caller): Extension<CallerContext>,
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<SetupRequest>,
) -> Response {
    let name = req.company_name.trim();
    if name.is_empty() {
        return access_error_response(&AccessError::validation("company_name must not be empty"));
    }

    let identity = caller.identity().clone();

    // Already set up: nothing to create.
    if let TenantResolution::Resolved { tenant_id, .. } = caller.resolution() {
        return (
            StatusCode::OK,
            Json(json!({ "tenant_id": tenant_id, "created": false })),
        )
            .into_response();
    }

    let profiles = services.profile_store();
    let display_name = req
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| identity.email.split('@').next().unwrap_or("member"));

    if let Err(err) = profiles.ensure_profile(&identity, display_name).await {
        return access_error_response(&err);
    }

    let tenant_id = TenantId::new();
    match profiles.assign_tenant(identity.id, tenant_id).await {
        Ok(_) => {}
        // Lost the race: another request assigned a tenant first. Converge
        // on whatever the profile now says.
        Err(AccessError::Validation(_)) => {
            return match resolve_tenant(&*profiles, identity.id).await {
                Ok(TenantResolution::Resolved { tenant_id, .. }) => (
                    StatusCode::OK,
                    Json(json!({ "tenant_id": tenant_id, "created": false })),
                )
                    .into_response(),
                Ok(TenantResolution::NeedsSetup { .. }) => access_error_response(
                    &AccessError::storage("tenant assignment raced and resolved to none"),
                ),
                Err(err) => access_error_response(&err),
            };
        }
        Err(err) => return access_error_response(&err),
    }

    // The first identity to set up a tenant administers it.
    if let Err(err) = profiles.set_role(identity.id, Role::Admin).await {
        return access_error_response(&err);
    }

    let company: Company = match serde_json::from_value(json!({
        "name": name,
        "address": req.address,
        "phone": req.phone,
        "email": req.email,
    })) {
        Ok(company) => company,
        Err(e) => {
            return access_error_response(&AccessError::validation(format!(
                "invalid company payload: {e}"
            )));
        }
    };
    if let Err(err) = company.validate() {
        return access_error_response(&AccessError::validation(err.to_string()));
    }

    let accessor = services.scoped(tenant_id);
    match accessor.create(company).await {
        Ok(stored) => (
            StatusCode::CREATED,
            Json(json!({
                "tenant_id": tenant_id,
                "created": true,
                "company": stored,
            })),
        )
            .into_response(),
        Err(err) => access_error_response(&AccessError::from(err)),
    }
}
