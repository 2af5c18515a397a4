use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use derrick_core::{DomainError, RecordId, TenantId};

use crate::collection::Collection;
use crate::record::{impl_domain_record, require_non_empty, require_volume, validate_period};

/// Monthly production volumes for a well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionEntry {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default = "TenantId::nil")]
    pub company_id: TenantId,
    pub well_name: String,
    /// Accounting period, `YYYY-MM`.
    pub period: String,
    /// Oil produced, barrels.
    #[serde(default)]
    pub oil_bbl: f64,
    /// Gas produced, mcf.
    #[serde(default)]
    pub gas_mcf: f64,
    /// Water produced, barrels.
    #[serde(default)]
    pub water_bbl: f64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ProductionEntry {
    fn validate_fields(&self) -> Result<(), DomainError> {
        require_non_empty("well_name", &self.well_name)?;
        validate_period(&self.period)?;
        require_volume("oil_bbl", self.oil_bbl)?;
        require_volume("gas_mcf", self.gas_mcf)?;
        require_volume("water_bbl", self.water_bbl)?;
        Ok(())
    }
}

impl_domain_record!(ProductionEntry, Collection::Production);
