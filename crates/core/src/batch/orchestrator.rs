//! Batch orchestration.
//!
//! ```text
//! raw list ─► parse ─► [resolve ─► fetch ─► upsert] × N ─► BatchResult
//!                           (bounded, one task per symbol)
//! ```
//!
//! Each symbol runs in its own task so a panic or fault in one unit cannot
//! reach its siblings. `buffered` keeps at most `max_concurrency` units in
//! flight and yields them in input order.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::{stream, FutureExt, StreamExt};
use log::{debug, error, info, warn};
use stockview_market_data::{
    resolve, FetchOutcome, Market, MarketDataFetcher, Period, ResolvedSymbol,
};
use uuid::Uuid;

use super::model::{BatchEntry, BatchResult, RunOutcome, SymbolOutcome};
use super::symbols::parse_symbol_list;
use crate::series::SeriesStore;

pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

pub struct BatchOrchestrator {
    fetcher: Arc<MarketDataFetcher>,
    store: Arc<dyn SeriesStore>,
    max_concurrency: usize,
}

impl BatchOrchestrator {
    pub fn new(fetcher: Arc<MarketDataFetcher>, store: Arc<dyn SeriesStore>) -> Self {
        Self {
            fetcher,
            store,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Cap on symbols processed at once. Values below one are treated as one.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Fetch and persist every symbol in `raw_symbol_list`.
    ///
    /// Never panics and never returns an error: blank input is
    /// [`RunOutcome::NothingToDo`], per-symbol faults are recorded on their
    /// entry, and anything else becomes [`RunOutcome::Failed`].
    pub async fn run(&self, raw_symbol_list: &str, period: Period, market: Market) -> RunOutcome {
        let symbols = parse_symbol_list(raw_symbol_list);
        if symbols.is_empty() {
            debug!("Blank symbol list, nothing to do");
            return RunOutcome::NothingToDo;
        }

        let run_id = Uuid::now_v7();
        info!(
            "Batch {} started: {} symbol(s), period {}, market {}",
            run_id,
            symbols.len(),
            period,
            market
        );

        let batch = AssertUnwindSafe(self.run_batch(run_id, symbols, period, market));
        match batch.catch_unwind().await {
            Ok(result) => {
                let failures = result.failures();
                info!(
                    "Batch {} finished: {} stored, {} failed, {} without data",
                    run_id,
                    result.stored_count(),
                    failures.len(),
                    result.entries.len() - result.stored_count() - failures.len()
                );
                for failure in &failures {
                    warn!("Batch {}: {}", run_id, failure);
                }
                RunOutcome::Completed(result)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Batch {} aborted: {}", run_id, message);
                RunOutcome::Failed { message }
            }
        }
    }

    async fn run_batch(
        &self,
        run_id: Uuid,
        symbols: Vec<String>,
        period: Period,
        market: Market,
    ) -> BatchResult {
        let provider_id = self.fetcher.provider_id();
        let units = symbols.into_iter().map(|symbol| {
            let resolved = resolve(&symbol, market);
            let fetcher = Arc::clone(&self.fetcher);
            let store = Arc::clone(&self.store);
            async move {
                let task_resolved = resolved.clone();
                let handle = tokio::spawn(async move {
                    process_symbol(&fetcher, store.as_ref(), provider_id, &task_resolved, period)
                        .await
                });
                let outcome = match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        let reason = if e.is_panic() {
                            format!("internal error: {}", panic_message(e.into_panic().as_ref()))
                        } else {
                            "internal error: task cancelled".to_string()
                        };
                        error!("Symbol {} aborted: {}", symbol, reason);
                        SymbolOutcome::FetchFailed { reason }
                    }
                };
                BatchEntry {
                    symbol,
                    resolved,
                    outcome,
                }
            }
        });

        let entries = stream::iter(units)
            .buffered(self.max_concurrency)
            .collect::<Vec<_>>()
            .await;

        BatchResult {
            run_id,
            period,
            market,
            entries,
        }
    }
}

/// Resolve, fetch and persist a single symbol.
async fn process_symbol(
    fetcher: &MarketDataFetcher,
    store: &dyn SeriesStore,
    provider_id: &str,
    resolved: &ResolvedSymbol,
    period: Period,
) -> SymbolOutcome {
    let points = match fetcher.fetch(resolved, period).await {
        FetchOutcome::Series(points) => points,
        FetchOutcome::Empty => {
            debug!("No data found for {}", resolved.provider_id);
            return SymbolOutcome::NoData;
        }
        FetchOutcome::Failed(reason) => return SymbolOutcome::FetchFailed { reason },
    };

    let source_reference = format!("{}:{}:{}", provider_id, resolved.provider_id, period);

    match store
        .upsert_series(&resolved.provider_id, &points, &source_reference)
        .await
    {
        Ok(summary) => {
            info!(
                "Stored {}: {} modified, {} inserted, {} unchanged, {} failed",
                resolved.provider_id,
                summary.modified_count,
                summary.inserted_count,
                summary.matched_count,
                summary.failed_count
            );
            SymbolOutcome::Stored { points, summary }
        }
        Err(e) => {
            error!("Store failed for {}: {}", resolved.provider_id, e);
            SymbolOutcome::StoreFailed {
                points,
                reason: e.to_string(),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected internal error".to_string()
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
