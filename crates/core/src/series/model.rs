//! Persisted series models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use stockview_market_data::PricePoint;

/// One stored trading day for a symbol.
///
/// `(symbol, data.calendar_date())` is unique in every store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRecord {
    pub symbol: String,
    pub data: PricePoint,
    /// UTC time the record was last written with new values.
    pub last_updated: NaiveDateTime,
    pub source_reference: String,
}

/// A single point the store could not write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointFailure {
    pub trade_date: String,
    pub reason: String,
}

/// Aggregate counts for one `upsert_series` call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteSummary {
    /// Existing records that already held identical values.
    pub matched_count: usize,
    /// Existing records overwritten with new values.
    pub modified_count: usize,
    /// Records created for dates not stored before.
    pub inserted_count: usize,
    pub failed_count: usize,
    pub failures: Vec<PointFailure>,
}

impl WriteSummary {
    pub fn record_failure(&mut self, trade_date: impl Into<String>, reason: impl Into<String>) {
        self.failed_count += 1;
        self.failures.push(PointFailure {
            trade_date: trade_date.into(),
            reason: reason.into(),
        });
    }

    pub fn is_partial(&self) -> bool {
        self.failed_count > 0
    }
}
