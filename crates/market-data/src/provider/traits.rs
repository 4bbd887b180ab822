//! Historical data provider trait.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{Period, ProviderHistory};

use super::capabilities::RateLimit;

/// Source of historical daily bars.
///
/// Implementations only talk to the upstream service and map its errors into
/// [`MarketDataError`]. Validation, zone conversion and retries live in the
/// fetcher so every provider behaves the same from the caller's side.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use stockview_market_data::provider::{HistoryProvider, RateLimit};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl HistoryProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn rate_limit(&self) -> RateLimit {
///         RateLimit::default()
///     }
///
///     // ... implement get_history
/// }
/// ```
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Unique identifier for this provider, e.g. "YAHOO".
    ///
    /// Used for logging, rate limiting and source references.
    fn id(&self) -> &'static str;

    /// Rate limits that should be applied when calling this provider.
    fn rate_limit(&self) -> RateLimit;

    /// Fetch daily bars for `instrument_id` over `period`.
    ///
    /// An instrument with no bars may be reported either as an empty
    /// [`ProviderHistory`] or as [`MarketDataError::NoDataForRange`] /
    /// [`MarketDataError::SymbolNotFound`]; the fetcher treats all three as "no data".
    async fn get_history(
        &self,
        instrument_id: &str,
        period: Period,
    ) -> Result<ProviderHistory, MarketDataError>;
}
