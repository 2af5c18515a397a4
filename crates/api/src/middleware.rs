use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use derrick_auth::{
    AccessError, Identity, ProfileStore, SessionClaims, SessionVerifier, TenantResolution,
    credential_fingerprint, enforce_isolation, resolve_tenant, validate_claims,
};
use derrick_core::TenantId;

use crate::app::errors;
use crate::context::{CallerContext, TenantContext};

/// Cookie carrying the session credential.
pub const SESSION_COOKIE: &str = "derrick_session";

/// Optional caller-claimed tenant header, checked by the isolation guard.
pub const TENANT_HEADER: &str = "x-tenant-id";

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn SessionVerifier>,
    pub profiles: Arc<dyn ProfileStore>,
    pub sessions: Arc<SessionCache>,
}

/// Short-lived cache of decoded session claims, keyed by credential
/// fingerprint.
///
/// Exists only to skip redundant signature verification across the burst of
/// requests a dashboard page issues with the same credential. Entries expire
/// unconditionally after the TTL, and only the decode is memoized: the claim
/// time window is re-validated against the current clock on every request,
/// so an expired token is rejected even while its entry is live.
pub struct SessionCache {
    ttl: Duration,
    inner: Mutex<HashMap<u64, (Instant, SessionClaims)>>,
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

impl SessionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn resolve(
        &self,
        credential: &str,
        verifier: &dyn SessionVerifier,
    ) -> Result<Identity, AccessError> {
        let fingerprint = credential_fingerprint(credential);
        let now = Instant::now();

        let cached = {
            let mut cache = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            cache.retain(|_, (expires_at, _)| *expires_at > now);
            cache.get(&fingerprint).map(|(_, claims)| claims.clone())
        };

        let claims = match cached {
            Some(claims) => claims,
            None => {
                let claims = verifier.decode(credential)?;
                let mut cache = self.inner.lock().unwrap_or_else(|e| e.into_inner());
                cache.insert(fingerprint, (now + self.ttl, claims.clone()));
                claims
            }
        };

        // The time window is never cached.
        validate_claims(&claims, Utc::now()).map_err(|e| {
            tracing::debug!("session claims rejected: {e}");
            AccessError::Unauthenticated
        })?;
        Ok(claims.identity())
    }
}

/// Resolve the session and the caller's tenant membership.
///
/// Rejects with 401 when no valid credential is present. A missing profile or
/// null tenant does **not** reject here: the resolution travels with the
/// request so the session/setup routes can serve it, and the tenant
/// middleware below turns it into `needs_setup` for data routes.
pub async fn authenticate(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let credential = extract_credential(req.headers())
        .ok_or_else(|| errors::access_error_response(&AccessError::Unauthenticated))?;

    let identity = state
        .sessions
        .resolve(&credential, state.verifier.as_ref())
        .map_err(|e| errors::access_error_response(&e))?;

    let resolution = resolve_tenant(&*state.profiles, identity.id)
        .await
        .map_err(|e| errors::access_error_response(&e))?;

    req.extensions_mut()
        .insert(CallerContext::new(identity, resolution));
    Ok(next.run(req).await)
}

/// Require a resolved tenant and run the isolation guard.
///
/// Inserts [`TenantContext`] carrying the authoritative tenant id; every data
/// handler downstream reads the tenant from there and nowhere else.
pub async fn require_tenant(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let caller = req
        .extensions()
        .get::<CallerContext>()
        .cloned()
        .ok_or_else(|| {
            errors::json_error(
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "caller context missing",
            )
        })?;

    let resolved = match caller.resolution() {
        TenantResolution::Resolved { tenant_id, .. } => *tenant_id,
        TenantResolution::NeedsSetup { .. } => {
            return Err(errors::access_error_response(&AccessError::NeedsSetup));
        }
    };

    let claimed = claimed_tenant(req.headers()).map_err(|e| errors::access_error_response(&e))?;
    let authoritative =
        enforce_isolation(resolved, claimed).map_err(|e| errors::access_error_response(&e))?;

    req.extensions_mut()
        .insert(TenantContext::new(authoritative));
    Ok(next.run(req).await)
}

/// Isolation check for routes reachable without a resolved tenant.
///
/// `/api/session` and `/api/setup` must stay usable in the `NeedsSetup`
/// state, but a resolved caller claiming a foreign tenant there is refused
/// exactly as on the data routes.
pub async fn check_claimed_tenant(
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let claimed = claimed_tenant(req.headers()).map_err(|e| errors::access_error_response(&e))?;

    if let Some(caller) = req.extensions().get::<CallerContext>() {
        if let TenantResolution::Resolved { tenant_id, .. } = caller.resolution() {
            enforce_isolation(*tenant_id, claimed)
                .map_err(|e| errors::access_error_response(&e))?;
        }
    }
    Ok(next.run(req).await)
}

/// Bearer token, falling back to the session cookie. A non-Bearer
/// `Authorization` header (e.g. Basic) is not ours and does not mask the
/// cookie.
fn extract_credential(headers: &HeaderMap) -> Option<String> {
    if let Some(header) = headers.get(axum::http::header::AUTHORIZATION) {
        if let Some(token) = header.to_str().ok().and_then(|h| h.strip_prefix("Bearer ")) {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    let cookies = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

fn claimed_tenant(headers: &HeaderMap) -> Result<Option<TenantId>, AccessError> {
    let Some(raw) = headers.get(TENANT_HEADER) else {
        return Ok(None);
    };
    let raw = raw
        .to_str()
        .map_err(|_| AccessError::validation("x-tenant-id header is not valid text"))?;
    let tenant_id = raw
        .parse::<TenantId>()
        .map_err(|_| AccessError::validation("x-tenant-id header is not a valid id"))?;
    Ok(Some(tenant_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Duration as ChronoDuration;
    use derrick_auth::Hs256SessionVerifier;
    use derrick_core::IdentityId;
    use jsonwebtoken::{Algorithm, EncodingKey, Header};

    fn mint(secret: &str, validity: ChronoDuration) -> String {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: IdentityId::new(),
            email: "pumper@example.com".to_string(),
            issued_at: now,
            expires_at: now + validity,
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn cache_never_extends_an_expired_session() {
        let verifier = Hs256SessionVerifier::new("s3cret");
        // TTL far longer than the token: the entry is still live when the
        // token expires.
        let cache = SessionCache::new(Duration::from_secs(60));
        let token = mint("s3cret", ChronoDuration::milliseconds(200));

        assert!(cache.resolve(&token, &verifier).is_ok());

        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(
            cache.resolve(&token, &verifier),
            Err(AccessError::Unauthenticated)
        );
    }

    #[test]
    fn bearer_takes_precedence_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok-a"),
        );
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("derrick_session=tok-b"),
        );
        assert_eq!(extract_credential(&headers).as_deref(), Some("tok-a"));
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("theme=dark; derrick_session=tok-c; lang=en"),
        );
        assert_eq!(extract_credential(&headers).as_deref(), Some("tok-c"));
    }

    #[test]
    fn missing_credential_is_none() {
        assert_eq!(extract_credential(&HeaderMap::new()), None);
    }

    #[test]
    fn non_bearer_authorization_does_not_mask_the_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwdw=="),
        );
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("derrick_session=tok-d"),
        );
        assert_eq!(extract_credential(&headers).as_deref(), Some("tok-d"));
    }

    #[test]
    fn malformed_claimed_tenant_is_a_validation_error() {
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(matches!(
            claimed_tenant(&headers),
            Err(AccessError::Validation(_))
        ));
    }
}
