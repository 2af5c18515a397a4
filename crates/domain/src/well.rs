use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use derrick_core::{DomainError, RecordId, TenantId};

use crate::collection::Collection;
use crate::record::{impl_domain_record, require_non_empty};

/// Operational status of a well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WellStatus {
    #[default]
    Active,
    ShutIn,
    Plugged,
}

/// A well owned by exactly one company.
///
/// `id` and `company_id` default when absent from an inbound payload; the
/// accessor overwrites `company_id` with the session-resolved tenant either
/// way, so a payload-supplied value is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Well {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default = "TenantId::nil")]
    pub company_id: TenantId,
    pub name: String,
    pub api_number: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    #[serde(default)]
    pub status: WellStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Well {
    fn validate_fields(&self) -> Result<(), DomainError> {
        require_non_empty("name", &self.name)?;
        if let Some(api) = &self.api_number {
            // API well numbers are digit groups separated by dashes.
            if !api.chars().all(|c| c.is_ascii_digit() || c == '-') || api.is_empty() {
                return Err(DomainError::validation(format!(
                    "api_number must be digits and dashes, got '{api}'"
                )));
            }
        }
        Ok(())
    }
}

impl_domain_record!(Well, Collection::Wells);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DomainRecord;

    #[test]
    fn minimal_payload_deserializes_with_defaults() {
        let well: Well = serde_json::from_str(r#"{"name":"Smith #1"}"#).unwrap();
        assert!(well.company_id.is_nil());
        assert!(!well.id.is_nil());
        assert_eq!(well.status, WellStatus::Active);
        assert!(well.validate().is_ok());
    }

    #[test]
    fn empty_name_rejected() {
        let well: Well = serde_json::from_str(r#"{"name":"  "}"#).unwrap();
        assert!(well.validate().is_err());
    }

    #[test]
    fn bad_api_number_rejected() {
        let well: Well =
            serde_json::from_str(r#"{"name":"Smith #1","api_number":"42-abc"}"#).unwrap();
        assert!(well.validate().is_err());
    }
}
