use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use derrick_core::{DomainError, RecordId, TenantId};

use crate::collection::Collection;
use crate::record::{impl_domain_record, require_non_empty, validate_period};

/// Product the revenue was realized on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    #[default]
    Oil,
    Gas,
    Ngl,
}

/// A revenue line for a well and period. Amounts are integer cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueEntry {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default = "TenantId::nil")]
    pub company_id: TenantId,
    pub well_name: String,
    pub period: String,
    #[serde(default)]
    pub product: ProductKind,
    pub gross_cents: u64,
    pub net_cents: u64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl RevenueEntry {
    fn validate_fields(&self) -> Result<(), DomainError> {
        require_non_empty("well_name", &self.well_name)?;
        validate_period(&self.period)?;
        if self.net_cents > self.gross_cents {
            return Err(DomainError::validation(
                "net_cents cannot exceed gross_cents",
            ));
        }
        Ok(())
    }
}

impl_domain_record!(RevenueEntry, Collection::Revenue);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DomainRecord;

    #[test]
    fn net_above_gross_rejected() {
        let entry: RevenueEntry = serde_json::from_str(
            r#"{"well_name":"Smith #1","period":"2026-07","gross_cents":1000,"net_cents":1200}"#,
        )
        .unwrap();
        assert!(entry.validate().is_err());
    }
}
