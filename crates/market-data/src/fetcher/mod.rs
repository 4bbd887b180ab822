//! Historical series fetcher.
//!
//! Wraps a [`HistoryProvider`] with rate limiting, an optional per-call
//! deadline and bounded retries, then validates and zone-normalizes the
//! bars. The result is always a [`FetchOutcome`]; provider faults never
//! escape as errors.

mod rate_limiter;
mod validator;

pub use rate_limiter::RateLimiter;
pub use validator::to_price_point;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::errors::{MarketDataError, RetryClass};
use crate::models::{Market, Period, PricePoint, ProviderHistory, ResolvedSymbol};
use crate::provider::HistoryProvider;

/// Result of fetching one symbol.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    /// Validated points, ascending by trade date.
    Series(Vec<PricePoint>),
    /// The provider had nothing for this symbol and window.
    Empty,
    /// Transport or provider fault, with a human-readable reason.
    Failed(String),
}

/// Tunables for [`MarketDataFetcher`].
#[derive(Clone, Debug)]
pub struct FetcherConfig {
    /// Upper bound on a single provider call. `None` waits indefinitely.
    pub deadline: Option<Duration>,
    /// Extra attempts for errors classified [`RetryClass::WithBackoff`].
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further attempt.
    pub retry_base_delay: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            deadline: Some(Duration::from_secs(30)),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

pub struct MarketDataFetcher {
    provider: Arc<dyn HistoryProvider>,
    rate_limiter: Arc<RateLimiter>,
    config: FetcherConfig,
}

impl MarketDataFetcher {
    pub fn new(provider: Arc<dyn HistoryProvider>) -> Self {
        Self::with_config(provider, FetcherConfig::default())
    }

    pub fn with_config(provider: Arc<dyn HistoryProvider>, config: FetcherConfig) -> Self {
        Self {
            provider,
            rate_limiter: Arc::new(RateLimiter::new()),
            config,
        }
    }

    /// Id of the underlying provider, e.g. "YAHOO".
    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }

    /// Fetch and normalize the series for `resolved` over `period`.
    pub async fn fetch(&self, resolved: &ResolvedSymbol, period: Period) -> FetchOutcome {
        let mut attempt: u32 = 0;
        loop {
            match self.fetch_once(resolved, period).await {
                Ok(history) => return normalize_history(resolved, history),
                Err(e) if e.is_no_data() => {
                    debug!("No data for {}: {}", resolved.provider_id, e);
                    return FetchOutcome::Empty;
                }
                Err(e)
                    if e.retry_class() == RetryClass::WithBackoff
                        && attempt < self.config.max_retries =>
                {
                    let delay = self.config.retry_base_delay * 2u32.saturating_pow(attempt);
                    attempt += 1;
                    warn!(
                        "Fetch for {} failed ({}), retry {}/{} in {:?}",
                        resolved.provider_id, e, attempt, self.config.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!("Fetch for {} failed: {}", resolved.provider_id, e);
                    return FetchOutcome::Failed(e.to_string());
                }
            }
        }
    }

    async fn fetch_once(
        &self,
        resolved: &ResolvedSymbol,
        period: Period,
    ) -> Result<ProviderHistory, MarketDataError> {
        let provider_id = self.provider.id();
        self.rate_limiter
            .acquire(provider_id, &self.provider.rate_limit())
            .await;

        let call = self.provider.get_history(&resolved.provider_id, period);
        match self.config.deadline {
            Some(deadline) => tokio::time::timeout(deadline, call)
                .await
                .map_err(|_| MarketDataError::Timeout {
                    provider: provider_id.to_string(),
                })?,
            None => call.await,
        }
    }
}

/// Zone the bars of `market` are expressed in.
///
/// Markets with a reference zone always use it. Otherwise the provider's
/// native zone is kept, falling back to UTC when it is missing or unknown.
pub fn target_zone(market: Market, native: Option<&str>) -> Tz {
    if let Some(zone) = market.reference_timezone() {
        return zone;
    }
    match native.map(str::parse::<Tz>) {
        Some(Ok(zone)) => zone,
        Some(Err(_)) => {
            warn!("Unknown provider time zone {:?}, using UTC", native);
            chrono_tz::UTC
        }
        None => chrono_tz::UTC,
    }
}

/// Validate raw bars, shift them to the market zone and order them by date.
///
/// Invalid bars are skipped. When two bars land on the same local date the
/// later one wins, so each date appears once.
pub fn normalize_history(resolved: &ResolvedSymbol, history: ProviderHistory) -> FetchOutcome {
    let zone = target_zone(resolved.market, history.timezone.as_deref());

    let mut valid: Vec<PricePoint> = history
        .bars
        .iter()
        .filter_map(|bar| match to_price_point(bar, zone) {
            Ok(point) => Some(point),
            Err(e) => {
                warn!(
                    "Skipping bar for {} at {}: {}",
                    resolved.provider_id, bar.timestamp, e
                );
                None
            }
        })
        .collect();
    valid.sort_by_key(|p| p.trade_date);

    let by_date: BTreeMap<NaiveDate, PricePoint> = valid
        .into_iter()
        .map(|p| (p.calendar_date(), p))
        .collect();

    if by_date.is_empty() {
        return FetchOutcome::Empty;
    }
    FetchOutcome::Series(by_date.into_values().collect())
}
