//! Session resolution: opaque credential material -> [`Identity`].

use std::hash::{DefaultHasher, Hash, Hasher};

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::error::AccessError;
use crate::identity::{Identity, SessionClaims, validate_claims};

/// Resolves an [`Identity`] from an opaque session credential.
///
/// This is the only component that interprets the credential. Any
/// provider-side failure (malformed token, bad signature, expired session)
/// collapses to [`AccessError::Unauthenticated`] so that provider internals
/// never leak to callers.
///
/// Decoding and timing are split on purpose: decoded claims may be memoized
/// (the signature on an unchanged credential cannot change), but the time
/// window must be re-checked against the current clock on every request.
pub trait SessionVerifier: Send + Sync {
    /// Decode the credential and check its signature. Timing is **not**
    /// checked here.
    fn decode(&self, credential: &str) -> Result<SessionClaims, AccessError>;

    /// Full verification: decode, then validate the time window at `now`.
    fn verify(&self, credential: &str, now: DateTime<Utc>) -> Result<Identity, AccessError> {
        let claims = self.decode(credential)?;
        validate_claims(&claims, now).map_err(|e| {
            tracing::debug!("session claims rejected: {e}");
            AccessError::Unauthenticated
        })?;
        Ok(claims.identity())
    }
}

/// HS256 session verifier backed by `jsonwebtoken`.
pub struct Hs256SessionVerifier {
    key: DecodingKey,
}

impl Hs256SessionVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

impl SessionVerifier for Hs256SessionVerifier {
    fn decode(&self, credential: &str) -> Result<SessionClaims, AccessError> {
        // Claims use issued_at/expires_at and are validated by validate_claims,
        // so the library's registered-claim checks are switched off.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let decoded = jsonwebtoken::decode::<SessionClaims>(credential, &self.key, &validation)
            .map_err(|e| {
                tracing::debug!("session token rejected: {e}");
                AccessError::Unauthenticated
            })?;
        Ok(decoded.claims)
    }
}

/// Stable fingerprint of a credential, used to key the short-lived verifier
/// cache. Not a security primitive: a colliding fingerprint only costs a
/// redundant verification, it never grants access.
pub fn credential_fingerprint(credential: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    credential.hash(&mut hasher);
    hasher.finish()
}
