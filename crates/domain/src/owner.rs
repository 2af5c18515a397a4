use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use derrick_core::{DomainError, RecordId, TenantId};

use crate::collection::Collection;
use crate::record::{impl_domain_record, require_non_empty};

/// An interest owner receiving distributions from the company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default = "TenantId::nil")]
    pub company_id: TenantId,
    pub name: String,
    pub owner_number: Option<String>,
    /// Decimal interest, 0.0..=1.0.
    pub decimal_interest: f64,
    pub address: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Owner {
    fn validate_fields(&self) -> Result<(), DomainError> {
        require_non_empty("name", &self.name)?;
        if !self.decimal_interest.is_finite()
            || !(0.0..=1.0).contains(&self.decimal_interest)
        {
            return Err(DomainError::validation(
                "decimal_interest must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

impl_domain_record!(Owner, Collection::Owners);
