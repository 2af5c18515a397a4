use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use derrick_core::{DomainError, RecordId, TenantId};

use crate::collection::Collection;
use crate::record::{impl_domain_record, require_non_empty};

/// Kind of maintenance work performed on a well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceKind {
    #[default]
    Scheduled,
    Repair,
    Workover,
}

/// A maintenance event against a well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default = "TenantId::nil")]
    pub company_id: TenantId,
    pub well_name: String,
    pub performed_on: NaiveDate,
    #[serde(default)]
    pub kind: MaintenanceKind,
    pub summary: String,
    #[serde(default)]
    pub cost_cents: u64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl MaintenanceRecord {
    fn validate_fields(&self) -> Result<(), DomainError> {
        require_non_empty("well_name", &self.well_name)?;
        require_non_empty("summary", &self.summary)?;
        Ok(())
    }
}

impl_domain_record!(MaintenanceRecord, Collection::Maintenance);
