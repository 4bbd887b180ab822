use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::{debug, warn};
use rust_decimal::Decimal;
use stockview_core::errors::Error;
use stockview_core::series::{SeriesRecord, SeriesStore, WriteSummary};
use stockview_core::Result;
use stockview_market_data::PricePoint;

use super::model::{PriceRecordDB, DATE_FORMAT};
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::price_records::dsl as price_records_dsl;
use crate::utils::chunk_for_sqlite;

pub struct SeriesRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl SeriesRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Reasons a point is refused before it reaches SQL.
fn check_point(point: &PricePoint) -> std::result::Result<(), String> {
    let prices = [
        ("open", point.open),
        ("high", point.high),
        ("low", point.low),
        ("close", point.close),
    ];
    if let Some((name, value)) = prices.iter().find(|(_, v)| *v < Decimal::ZERO) {
        return Err(format!("negative {} price {}", name, value));
    }
    if point.high < point.low {
        return Err(format!("high {} below low {}", point.high, point.low));
    }
    if point.volume < 0 {
        return Err(format!("negative volume {}", point.volume));
    }
    Ok(())
}

/// Apply one batch of points for `symbol` on the writer connection.
fn upsert_rows(
    conn: &mut SqliteConnection,
    symbol: &str,
    points: &[PricePoint],
    source_reference: &str,
) -> Result<WriteSummary> {
    let now = Utc::now().naive_utc();
    let rows: Vec<PriceRecordDB> = points
        .iter()
        .map(|p| PriceRecordDB::from_point(symbol, p, source_reference, now))
        .collect();

    let dates: Vec<String> = rows.iter().map(|r| r.trade_date.clone()).collect();
    let mut existing: HashMap<String, PriceRecordDB> = HashMap::new();
    for chunk in chunk_for_sqlite(&dates) {
        let stored = price_records_dsl::price_records
            .filter(price_records_dsl::symbol.eq(symbol))
            .filter(price_records_dsl::trade_date.eq_any(chunk))
            .select(PriceRecordDB::as_select())
            .load::<PriceRecordDB>(conn)
            .into_core()?;
        existing.extend(stored.into_iter().map(|r| (r.trade_date.clone(), r)));
    }

    let mut summary = WriteSummary::default();
    for (point, row) in points.iter().zip(rows) {
        if let Err(reason) = check_point(point) {
            warn!("Rejected {} {}: {}", symbol, row.trade_date, reason);
            summary.record_failure(row.trade_date, reason);
            continue;
        }

        let stored = existing.get(&row.trade_date);
        if stored.is_some_and(|stored| stored.same_values(&row)) {
            summary.matched_count += 1;
            continue;
        }

        let is_update = stored.is_some();
        let written = if is_update {
            diesel::update(
                price_records_dsl::price_records
                    .filter(price_records_dsl::symbol.eq(symbol))
                    .filter(price_records_dsl::trade_date.eq(&row.trade_date)),
            )
            .set(&row)
            .execute(conn)
        } else {
            diesel::insert_into(price_records_dsl::price_records)
                .values(&row)
                .execute(conn)
        };

        match written {
            Ok(_) if is_update => summary.modified_count += 1,
            Ok(_) => summary.inserted_count += 1,
            Err(e) => {
                warn!("Failed to write {} {}: {}", symbol, row.trade_date, e);
                summary.record_failure(row.trade_date, e.to_string());
                continue;
            }
        }
        existing.insert(row.trade_date.clone(), row);
    }

    Ok(summary)
}

#[async_trait]
impl SeriesStore for SeriesRepository {
    async fn upsert_series(
        &self,
        symbol: &str,
        points: &[PricePoint],
        source_reference: &str,
    ) -> Result<WriteSummary> {
        if points.is_empty() {
            return Ok(WriteSummary::default());
        }

        let symbol = symbol.to_string();
        let source_reference = source_reference.to_string();
        let points = points.to_vec();

        let summary = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<WriteSummary> {
                upsert_rows(conn, &symbol, &points, &source_reference)
            })
            .await?;

        debug!(
            "upsert_series: {} matched, {} modified, {} inserted, {} failed",
            summary.matched_count,
            summary.modified_count,
            summary.inserted_count,
            summary.failed_count
        );
        Ok(summary)
    }

    fn load_series(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SeriesRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = price_records_dsl::price_records
            .filter(price_records_dsl::symbol.eq(symbol))
            .order(price_records_dsl::trade_date.asc())
            .select(PriceRecordDB::as_select())
            .into_boxed();

        if let Some(start) = start {
            let start = start.format(DATE_FORMAT).to_string();
            query = query.filter(price_records_dsl::trade_date.ge(start));
        }

        if let Some(end) = end {
            let end = end.format(DATE_FORMAT).to_string();
            query = query.filter(price_records_dsl::trade_date.le(end));
        }

        let rows = query
            .load::<PriceRecordDB>(&mut conn)
            .into_core()?;

        rows.into_iter()
            .map(|row| row.into_record().map_err(Error::from))
            .collect()
    }

    fn list_symbols(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;

        price_records_dsl::price_records
            .select(price_records_dsl::symbol)
            .distinct()
            .order(price_records_dsl::symbol.asc())
            .load::<String>(&mut conn)
            .into_core()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use chrono::{FixedOffset, TimeZone};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    async fn create_test_repository() -> (
        SeriesRepository,
        Arc<Pool<ConnectionManager<SqliteConnection>>>,
        tempfile::TempDir,
    ) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        let repo = SeriesRepository::new(Arc::clone(&pool), writer);
        (repo, pool, temp_dir)
    }

    fn eastern() -> FixedOffset {
        FixedOffset::west_opt(4 * 3600).unwrap()
    }

    fn point(day: u32, close: Decimal) -> PricePoint {
        PricePoint {
            trade_date: eastern().with_ymd_and_hms(2024, 4, day, 9, 30, 0).unwrap(),
            open: dec!(170),
            high: dec!(180),
            low: dec!(165),
            close,
            volume: 50_000_000,
        }
    }

    fn month(closes: &[(u32, Decimal)]) -> Vec<PricePoint> {
        closes.iter().map(|(day, close)| point(*day, *close)).collect()
    }

    #[tokio::test]
    async fn test_first_upsert_inserts_every_point() {
        let (repo, _pool, _temp_dir) = create_test_repository().await;
        let points = month(&[(1, dec!(171)), (2, dec!(172)), (3, dec!(173))]);

        let summary = repo
            .upsert_series("AAPL", &points, "YAHOO:AAPL:1mo")
            .await
            .expect("upsert");

        assert_eq!(summary.inserted_count, 3);
        assert_eq!(summary.modified_count, 0);
        assert_eq!(summary.matched_count, 0);
        assert!(!summary.is_partial());

        let stored = repo.load_series("AAPL", None, None).expect("load");
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0].source_reference, "YAHOO:AAPL:1mo");
        assert_eq!(stored[2].data.close, dec!(173));
    }

    #[tokio::test]
    async fn test_identical_upsert_is_idempotent() {
        let (repo, _pool, _temp_dir) = create_test_repository().await;
        let points = month(&[(1, dec!(171)), (2, dec!(172))]);

        repo.upsert_series("AAPL", &points, "YAHOO:AAPL:1mo")
            .await
            .expect("first upsert");
        let before = repo.load_series("AAPL", None, None).expect("load");

        let summary = repo
            .upsert_series("AAPL", &points, "YAHOO:AAPL:1mo")
            .await
            .expect("second upsert");

        assert_eq!(summary.inserted_count, 0);
        assert_eq!(summary.modified_count, 0);
        assert_eq!(summary.matched_count, 2);
        let after = repo.load_series("AAPL", None, None).expect("load");
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_overlapping_windows_never_duplicate_a_day() {
        let (repo, _pool, _temp_dir) = create_test_repository().await;

        repo.upsert_series("AAPL", &month(&[(1, dec!(171)), (2, dec!(172))]), "YAHOO:AAPL:5d")
            .await
            .expect("first window");
        let summary = repo
            .upsert_series(
                "AAPL",
                &month(&[(2, dec!(172.5)), (3, dec!(173))]),
                "YAHOO:AAPL:1mo",
            )
            .await
            .expect("second window");

        assert_eq!(summary.modified_count, 1);
        assert_eq!(summary.inserted_count, 1);

        let stored = repo.load_series("AAPL", None, None).expect("load");
        let dates: Vec<String> = stored
            .iter()
            .map(|r| r.data.calendar_date().to_string())
            .collect();
        assert_eq!(dates, vec!["2024-04-01", "2024-04-02", "2024-04-03"]);
        assert_eq!(stored[1].data.close, dec!(172.5));
        assert_eq!(stored[1].source_reference, "YAHOO:AAPL:1mo");
        assert_eq!(stored[0].source_reference, "YAHOO:AAPL:5d");
    }

    #[tokio::test]
    async fn test_empty_input_is_a_no_op() {
        let (repo, _pool, _temp_dir) = create_test_repository().await;

        let summary = repo
            .upsert_series("AAPL", &[], "YAHOO:AAPL:1mo")
            .await
            .expect("upsert");

        assert_eq!(summary, WriteSummary::default());
        assert!(repo.list_symbols().expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_invalid_point_does_not_block_siblings() {
        let (repo, _pool, _temp_dir) = create_test_repository().await;
        let mut points = month(&[(1, dec!(171)), (2, dec!(172)), (3, dec!(173))]);
        points[1].volume = -5;

        let summary = repo
            .upsert_series("MSFT", &points, "YAHOO:MSFT:1mo")
            .await
            .expect("upsert");

        assert_eq!(summary.inserted_count, 2);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.failures[0].trade_date, "2024-04-02");
        assert!(summary.failures[0].reason.contains("volume"));
        assert_eq!(repo.load_series("MSFT", None, None).expect("load").len(), 2);
    }

    #[tokio::test]
    async fn test_sql_error_on_one_point_does_not_abort_siblings() {
        let (repo, _pool, _temp_dir) = create_test_repository().await;
        repo.writer
            .exec(|conn: &mut SqliteConnection| {
                diesel::sql_query(
                    "CREATE TRIGGER reject_day BEFORE INSERT ON price_records \
                     WHEN NEW.trade_date = '2024-04-02' \
                     BEGIN SELECT RAISE(ABORT, 'day is locked'); END;",
                )
                .execute(conn)
                .into_core()
            })
            .await
            .expect("install trigger");
        let points = month(&[(1, dec!(171)), (2, dec!(172)), (3, dec!(173))]);

        let summary = repo
            .upsert_series("NVDA", &points, "YAHOO:NVDA:1mo")
            .await
            .expect("upsert");

        assert_eq!(summary.inserted_count, 2);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.failures[0].trade_date, "2024-04-02");
        assert!(summary.failures[0].reason.contains("day is locked"));
        let stored = repo.load_series("NVDA", None, None).expect("load");
        let days: Vec<String> = stored
            .iter()
            .map(|r| r.data.calendar_date().to_string())
            .collect();
        assert_eq!(days, vec!["2024-04-01", "2024-04-03"]);
    }

    #[tokio::test]
    async fn test_same_ticker_on_two_markets_keeps_separate_rows() {
        let (repo, _pool, _temp_dir) = create_test_repository().await;
        let points = month(&[(1, dec!(100))]);

        repo.upsert_series("TCS", &points, "YAHOO:TCS:1mo")
            .await
            .expect("us");
        repo.upsert_series("TCS.NS", &points, "YAHOO:TCS.NS:1mo")
            .await
            .expect("nse");

        assert_eq!(repo.list_symbols().expect("list"), vec!["TCS", "TCS.NS"]);
        assert_eq!(repo.load_series("TCS", None, None).expect("load").len(), 1);
    }

    #[tokio::test]
    async fn test_load_series_applies_inclusive_bounds() {
        let (repo, _pool, _temp_dir) = create_test_repository().await;
        let points = month(&[
            (1, dec!(171)),
            (2, dec!(172)),
            (3, dec!(173)),
            (4, dec!(174)),
        ]);
        repo.upsert_series("AAPL", &points, "YAHOO:AAPL:1mo")
            .await
            .expect("upsert");

        let start = NaiveDate::from_ymd_opt(2024, 4, 2);
        let end = NaiveDate::from_ymd_opt(2024, 4, 3);
        let stored = repo.load_series("AAPL", start, end).expect("load");

        let closes: Vec<Decimal> = stored.iter().map(|r| r.data.close).collect();
        assert_eq!(closes, vec![dec!(172), dec!(173)]);
        assert!(repo
            .load_series("UNKNOWN", None, None)
            .expect("load")
            .is_empty());
    }

    #[tokio::test]
    async fn test_repeated_date_in_one_call_counts_once_as_insert() {
        let (repo, _pool, _temp_dir) = create_test_repository().await;
        let points = month(&[(1, dec!(171)), (1, dec!(171.5))]);

        let summary = repo
            .upsert_series("AAPL", &points, "YAHOO:AAPL:1mo")
            .await
            .expect("upsert");

        assert_eq!(summary.inserted_count, 1);
        assert_eq!(summary.modified_count, 1);
        let stored = repo.load_series("AAPL", None, None).expect("load");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].data.close, dec!(171.5));
    }
}
