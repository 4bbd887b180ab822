//! Series storage traits.
//!
//! Abstracts the persistence layer so the batch pipeline can run against
//! SQLite in production and in-memory doubles in tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use stockview_market_data::PricePoint;

use super::model::{SeriesRecord, WriteSummary};
use crate::errors::Result;

/// Storage interface for per-symbol daily series.
///
/// # Upsert contract
///
/// - Points are matched by `(symbol, trade date)`. A match with different
///   values is overwritten, a match with identical values is left untouched,
///   and a miss is inserted.
/// - Each point is written independently. A point that cannot be written is
///   reported in [`WriteSummary::failures`] and its siblings still go through.
/// - `Err` is returned only when the store itself is unreachable; point writes
///   that already succeeded are kept.
/// - An empty slice is a no-op returning zero counts.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    async fn upsert_series(
        &self,
        symbol: &str,
        points: &[PricePoint],
        source_reference: &str,
    ) -> Result<WriteSummary>;

    /// Stored records for `symbol`, ascending by date. Bounds are inclusive.
    fn load_series(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SeriesRecord>>;

    /// Distinct stored symbols, sorted.
    fn list_symbols(&self) -> Result<Vec<String>>;
}
