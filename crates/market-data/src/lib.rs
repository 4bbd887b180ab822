//! StockView Market Data Crate
//!
//! Provider-agnostic retrieval of daily price history.
//!
//! # Overview
//!
//! ```text
//! (ticker, Market) --resolve--> ResolvedSymbol --fetch--> FetchOutcome
//!                                                  |
//!                                 HistoryProvider (Yahoo) + rate limiter
//! ```
//!
//! # Core Types
//!
//! - [`Market`] - Default (US) or alternate (NSE) market
//! - [`Period`] - Look-back window (1d to 3mo)
//! - [`ResolvedSymbol`] - Ticker mapped to the provider identifier
//! - [`PricePoint`] - Validated OHLCV bar in the market's time zone
//! - [`FetchOutcome`] - `Series`, `Empty` or `Failed` per symbol

pub mod errors;
pub mod fetcher;
pub mod models;
pub mod provider;
pub mod resolver;

pub use errors::{MarketDataError, RetryClass};
pub use fetcher::{FetchOutcome, FetcherConfig, MarketDataFetcher, RateLimiter};
pub use models::{Market, Period, PricePoint, ProviderHistory, RawBar, ResolvedSymbol};
pub use provider::yahoo::YahooProvider;
pub use provider::{HistoryProvider, RateLimit};
pub use resolver::resolve;
