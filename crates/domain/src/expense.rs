use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use derrick_core::{DomainError, RecordId, TenantId};

use crate::collection::Collection;
use crate::record::{impl_domain_record, require_non_empty};

/// A lease operating expense charged against a well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default = "TenantId::nil")]
    pub company_id: TenantId,
    pub well_name: String,
    pub incurred_on: NaiveDate,
    pub category: String,
    pub vendor: Option<String>,
    pub amount_cents: u64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Expense {
    fn validate_fields(&self) -> Result<(), DomainError> {
        require_non_empty("well_name", &self.well_name)?;
        require_non_empty("category", &self.category)?;
        Ok(())
    }
}

impl_domain_record!(Expense, Collection::Expenses);
