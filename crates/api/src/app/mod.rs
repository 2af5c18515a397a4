//! HTTP application wiring (axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: storage wiring (in-memory or Postgres) behind one handle
//! - `routes/`: HTTP routes and handlers (collections are generic, the
//!   session/setup flow has its own file)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use derrick_auth::Hs256SessionVerifier;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(session_secret: &str, services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        verifier: Arc::new(Hs256SessionVerifier::new(session_secret.as_bytes())),
        profiles: services.profile_store(),
        sessions: Arc::new(middleware::SessionCache::default()),
    };

    // Data routes: require auth + resolved tenant + isolation guard.
    let data = routes::data_router().layer(axum::middleware::from_fn(middleware::require_tenant));

    // Session/setup routes: require auth but not a resolved tenant (they
    // serve the NeedsSetup state). A claimed-tenant header is still checked.
    let account = Router::new()
        .route("/session", get(routes::session::session_summary))
        .route("/setup", axum::routing::post(routes::session::run_setup))
        .layer(axum::middleware::from_fn(middleware::check_claimed_tenant));

    let api = account
        .merge(data)
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::authenticate,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", api)
        .layer(ServiceBuilder::new())
}
