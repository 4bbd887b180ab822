//! Yahoo Finance market data provider.
//!
//! Fetches daily bars with the chart endpoint (`get_quote_range`) and reports
//! the exchange time zone from the response metadata so the fetcher can keep
//! or shift timestamps per market.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{Period, ProviderHistory, RawBar};
use crate::provider::{HistoryProvider, RateLimit};

const PROVIDER_ID: &str = "YAHOO";

/// Yahoo Finance historical data provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, MarketDataError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to initialize Yahoo connector: {}", e),
            })?;
        Ok(Self { connector })
    }

    /// Build a raw bar from the primitive fields of a Yahoo quote.
    ///
    /// Yahoo encodes gaps as NaN, so non-finite prices become `None`.
    fn to_raw_bar(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: u64) -> RawBar {
        let finite = |v: f64| v.is_finite().then_some(v);
        RawBar {
            timestamp,
            open: finite(open),
            high: finite(high),
            low: finite(low),
            close: finite(close),
            volume: Some(volume),
        }
    }
}

/// Map a connector error to the crate's error taxonomy.
fn map_yahoo_error(symbol: &str, error: yahoo::YahooError) -> MarketDataError {
    match error {
        yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult => {
            MarketDataError::SymbolNotFound(symbol.to_string())
        }
        yahoo::YahooError::TooManyRequests(_) => MarketDataError::RateLimited {
            provider: PROVIDER_ID.to_string(),
        },
        yahoo::YahooError::ConnectionFailed(e) if e.is_timeout() => MarketDataError::Timeout {
            provider: PROVIDER_ID.to_string(),
        },
        other => MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl HistoryProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 2000,
            max_concurrency: 10,
            min_delay: Duration::from_millis(50),
        }
    }

    async fn get_history(
        &self,
        instrument_id: &str,
        period: Period,
    ) -> Result<ProviderHistory, MarketDataError> {
        debug!(
            "Fetching {} history for {} from Yahoo",
            period.as_range(),
            instrument_id
        );

        let response = self
            .connector
            .get_quote_range(instrument_id, period.interval(), period.as_range())
            .await
            .map_err(|e| map_yahoo_error(instrument_id, e))?;

        let timezone = match response.metadata() {
            Ok(meta) if !meta.exchange_timezone_name.is_empty() => {
                Some(meta.exchange_timezone_name.clone())
            }
            Ok(_) => None,
            Err(e) => {
                warn!("No metadata for '{}': {}", instrument_id, e);
                None
            }
        };

        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(yahoo::YahooError::NoQuotes) => {
                warn!(
                    "No historical quotes returned for '{}' over {}",
                    instrument_id, period
                );
                return Ok(ProviderHistory {
                    timezone,
                    bars: Vec::new(),
                });
            }
            Err(e) => return Err(map_yahoo_error(instrument_id, e)),
        };

        let bars = quotes
            .into_iter()
            .map(|q| Self::to_raw_bar(q.timestamp as i64, q.open, q.high, q.low, q.close, q.volume))
            .collect();

        Ok(ProviderHistory { timezone, bars })
    }
}
