use serde::Serialize;
use stockview_market_data::{Market, Period, PricePoint, ResolvedSymbol};
use uuid::Uuid;

use crate::series::WriteSummary;

/// What happened to one symbol in a batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SymbolOutcome {
    /// Fetched and persisted.
    Stored {
        points: Vec<PricePoint>,
        summary: WriteSummary,
    },
    /// The provider had no bars. Not an error.
    NoData,
    FetchFailed {
        reason: String,
    },
    /// Fetched but the store was unreachable. Not plotted.
    StoreFailed {
        points: Vec<PricePoint>,
        reason: String,
    },
}

impl SymbolOutcome {
    /// Points to plot, if the symbol made it through the whole pipeline.
    pub fn plotted_points(&self) -> Option<&[PricePoint]> {
        match self {
            SymbolOutcome::Stored { points, .. } => Some(points),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<String> {
        match self {
            SymbolOutcome::FetchFailed { reason } => Some(format!("fetch failed: {}", reason)),
            SymbolOutcome::StoreFailed { reason, .. } => Some(format!("store failed: {}", reason)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub symbol: String,
    pub resolved: ResolvedSymbol,
    pub outcome: SymbolOutcome,
}

/// Per-symbol outcomes of one run, in input order.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub run_id: Uuid,
    pub period: Period,
    pub market: Market,
    pub entries: Vec<BatchEntry>,
}

impl BatchResult {
    /// Entries with a plottable series, in input order.
    pub fn plotted(&self) -> impl Iterator<Item = (&BatchEntry, &[PricePoint])> {
        self.entries
            .iter()
            .filter_map(|entry| entry.outcome.plotted_points().map(|points| (entry, points)))
    }

    /// One line per failed symbol, e.g. `"MSFT: fetch failed: Timeout: YAHOO"`.
    pub fn failures(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry
                    .outcome
                    .failure_reason()
                    .map(|reason| format!("{}: {}", entry.symbol, reason))
            })
            .collect()
    }

    pub fn stored_count(&self) -> usize {
        self.plotted().count()
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.symbol.as_str()).collect()
    }
}

/// Result of a trigger.
#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    /// Blank input. Callers keep whatever they showed before.
    NothingToDo,
    Completed(BatchResult),
    /// A fault not attributable to any symbol.
    Failed { message: String },
}

/// Title and currency label for a market.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PresentationLabels {
    pub title: &'static str,
    pub currency: &'static str,
}

pub fn presentation_labels(market: Market) -> PresentationLabels {
    PresentationLabels {
        title: market.title(),
        currency: market.currency(),
    }
}
