use serde::{Deserialize, Serialize};

/// The tenant-scoped collections exposed by the HTTP surface.
///
/// The wire name doubles as the URL segment and the response-body key
/// (`GET /api/wells` -> `{ "wells": [...] }`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Wells,
    Production,
    Revenue,
    Expenses,
    Owners,
    Distributions,
    Maintenance,
    Companies,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Wells,
        Collection::Production,
        Collection::Revenue,
        Collection::Expenses,
        Collection::Owners,
        Collection::Distributions,
        Collection::Maintenance,
        Collection::Companies,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Collection::Wells => "wells",
            Collection::Production => "production",
            Collection::Revenue => "revenue",
            Collection::Expenses => "expenses",
            Collection::Owners => "owners",
            Collection::Distributions => "distributions",
            Collection::Maintenance => "maintenance",
            Collection::Companies => "companies",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

impl core::str::FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| format!("unknown collection: {s}"))
    }
}
