use serde::{Serialize, de::DeserializeOwned};

use derrick_core::{DomainError, RecordId, TenantId};

use crate::collection::Collection;

/// The uniform contract every tenant-scoped record satisfies.
///
/// # Invariants
/// - `tenant_id` is required and non-null once stored; the accessor stamps it
///   from the authoritative session-resolved tenant on every create, so a
///   tenant id carried in an inbound payload is never trusted.
/// - `id` is server-assigned on create, never taken from the payload; an id
///   carried inbound could otherwise collide with another tenant's row and
///   turn the insert into an existence probe.
/// - `validate` runs before any storage operation (fail fast, no partial
///   writes).
pub trait DomainRecord:
    Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    const COLLECTION: Collection;

    fn id(&self) -> RecordId;

    fn tenant_id(&self) -> TenantId;

    /// Overwrite the record id with the server-assigned one.
    fn stamp_id(&mut self, id: RecordId);

    /// Overwrite the owning tenant with the authoritative id.
    fn stamp_tenant(&mut self, tenant_id: TenantId);

    /// Deterministic payload validation (no IO).
    fn validate(&self) -> Result<(), DomainError>;
}

/// Validate a `YYYY-MM` production/accounting period.
pub fn validate_period(period: &str) -> Result<(), DomainError> {
    let bytes = period.as_bytes();
    let well_formed = bytes.len() == 7
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit);

    if !well_formed {
        return Err(DomainError::validation(format!(
            "period must be YYYY-MM, got '{period}'"
        )));
    }

    let month: u8 = period[5..].parse().map_err(|_| {
        DomainError::validation(format!("period must be YYYY-MM, got '{period}'"))
    })?;
    if !(1..=12).contains(&month) {
        return Err(DomainError::validation(format!(
            "period month out of range: '{period}'"
        )));
    }
    Ok(())
}


/// Implement the field plumbing of [`DomainRecord`] for a record struct with
/// `id` and `company_id` fields (the conventional column names).
macro_rules! impl_domain_record {
    ($t:ty, $collection:expr) => {
        impl crate::record::DomainRecord for $t {
            const COLLECTION: crate::collection::Collection = $collection;

            fn id(&self) -> derrick_core::RecordId {
                self.id
            }

            fn tenant_id(&self) -> derrick_core::TenantId {
                self.company_id
            }

            fn stamp_id(&mut self, id: derrick_core::RecordId) {
                self.id = id;
            }

            fn stamp_tenant(&mut self, tenant_id: derrick_core::TenantId) {
                self.company_id = tenant_id;
            }

            fn validate(&self) -> Result<(), derrick_core::DomainError> {
                self.validate_fields()
            }
        }
    };
}

pub(crate) use impl_domain_record;

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

pub(crate) fn require_volume(field: &'static str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_validation() {
        assert!(validate_period("2026-07").is_ok());
        assert!(validate_period("2026-13").is_err());
        assert!(validate_period("2026-00").is_err());
        assert!(validate_period("26-07").is_err());
        assert!(validate_period("2026/07").is_err());
    }
}
