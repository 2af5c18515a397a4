use serde::Deserialize;
use serde_json::{Map, Value};

use derrick_auth::AccessError;
use derrick_domain::DomainRecord;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SetupRequest {
    pub company_name: String,
    pub display_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

// -------------------------
// Response mapping
// -------------------------

/// Wrap rows under the collection-named key: `{ "wells": [...] }`.
pub fn collection_body<R: DomainRecord>(rows: &[R]) -> Result<Value, AccessError> {
    let rows =
        serde_json::to_value(rows).map_err(|_| AccessError::storage("response encoding failed"))?;
    let mut body = Map::new();
    body.insert(R::COLLECTION.key().to_string(), rows);
    Ok(Value::Object(body))
}

/// Preview a patch applied to a record, for validation before any write.
///
/// Top-level fields merge; `id` and `company_id` are not patchable (the store
/// enforces the same rule on the write path).
pub fn merged_record<R: DomainRecord>(current: &R, patch: &Value) -> Result<R, AccessError> {
    let Value::Object(fields) = patch else {
        return Err(AccessError::validation("patch must be a JSON object"));
    };

    let mut row = serde_json::to_value(current)
        .map_err(|_| AccessError::storage("record encoding failed"))?;
    if let Value::Object(target) = &mut row {
        for (k, v) in fields {
            if k == "id" || k == "company_id" {
                continue;
            }
            target.insert(k.clone(), v.clone());
        }
    }

    serde_json::from_value(row)
        .map_err(|e| AccessError::validation(format!("invalid patch: {e}")))
}
