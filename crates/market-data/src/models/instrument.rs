use serde::{Deserialize, Serialize};

use super::market::Market;

/// A user ticker mapped to the identifier the provider understands.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSymbol {
    pub base_symbol: String,
    pub market: Market,
    /// Provider-specific instrument identifier, e.g. `RELIANCE.NS`.
    pub provider_id: String,
}
