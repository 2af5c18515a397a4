use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use derrick_core::{DomainError, RecordId, TenantId};

use crate::collection::Collection;
use crate::record::{impl_domain_record, require_non_empty, validate_period};

/// A payment distributed to an interest owner for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default = "TenantId::nil")]
    pub company_id: TenantId,
    pub owner_name: String,
    pub period: String,
    pub amount_cents: u64,
    pub check_number: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Distribution {
    fn validate_fields(&self) -> Result<(), DomainError> {
        require_non_empty("owner_name", &self.owner_name)?;
        validate_period(&self.period)?;
        Ok(())
    }
}

impl_domain_record!(Distribution, Collection::Distributions);
