use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use derrick_core::{DomainError, RecordId, TenantId};

use crate::collection::Collection;
use crate::record::{impl_domain_record, require_non_empty};

/// The tenant itself, represented as a row like any other collection.
///
/// `company_id` equals the tenant id the row describes; the list endpoint for
/// companies therefore only ever returns the caller's own company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default = "TenantId::nil")]
    pub company_id: TenantId,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Company {
    fn validate_fields(&self) -> Result<(), DomainError> {
        require_non_empty("name", &self.name)
    }
}

impl_domain_record!(Company, Collection::Companies);
