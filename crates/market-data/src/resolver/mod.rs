//! Symbol resolution for market data providers.
//!
//! Converts a user ticker plus a [`Market`] into the identifier the provider
//! expects. Resolution is pure and never fails: markets without an exchange
//! suffix pass the ticker through unchanged.
//!
//! Case and whitespace are the caller's responsibility; the batch layer
//! normalizes symbols before they reach this module.
//!
//! ```
//! use stockview_market_data::{resolver::resolve, Market};
//!
//! let resolved = resolve("RELIANCE", Market::Nse);
//! assert_eq!(resolved.provider_id, "RELIANCE.NS");
//! ```

use crate::models::{Market, ResolvedSymbol};

/// Map `base_symbol` to the provider identifier for `market`.
pub fn resolve(base_symbol: &str, market: Market) -> ResolvedSymbol {
    let provider_id = match market.exchange_suffix() {
        Some(suffix) => format!("{}{}", base_symbol, suffix),
        None => base_symbol.to_string(),
    };

    ResolvedSymbol {
        base_symbol: base_symbol.to_string(),
        market,
        provider_id,
    }
}
