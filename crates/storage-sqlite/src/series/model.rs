//! Database model for stored daily price records.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use stockview_core::series::SeriesRecord;
use stockview_market_data::PricePoint;

use crate::errors::StorageError;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// One row of `price_records`.
///
/// Prices are kept as decimal strings so nothing is lost to floating point.
/// `trade_date` is the local calendar date of the bar and, together with
/// `symbol`, the primary key.
#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::price_records)]
#[diesel(primary_key(symbol, trade_date))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceRecordDB {
    pub symbol: String,
    pub trade_date: String,
    pub trade_timestamp: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: i64,
    pub last_updated: NaiveDateTime,
    pub source_reference: String,
}

impl PriceRecordDB {
    pub fn from_point(
        symbol: &str,
        point: &PricePoint,
        source_reference: &str,
        last_updated: NaiveDateTime,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            trade_date: point.calendar_date().format(DATE_FORMAT).to_string(),
            trade_timestamp: point.trade_date.to_rfc3339(),
            open: point.open.to_string(),
            high: point.high.to_string(),
            low: point.low.to_string(),
            close: point.close.to_string(),
            volume: point.volume,
            last_updated,
            source_reference: source_reference.to_string(),
        }
    }

    /// True when both rows hold the same bar. Bookkeeping columns
    /// (`last_updated`, `source_reference`) are ignored and prices compare
    /// numerically, so `100.0` equals `100.00`.
    pub fn same_values(&self, other: &PriceRecordDB) -> bool {
        self.trade_timestamp == other.trade_timestamp
            && self.volume == other.volume
            && same_decimal(&self.open, &other.open)
            && same_decimal(&self.high, &other.high)
            && same_decimal(&self.low, &other.low)
            && same_decimal(&self.close, &other.close)
    }

    pub fn into_record(self) -> Result<SeriesRecord, StorageError> {
        let trade_date = DateTime::parse_from_rfc3339(&self.trade_timestamp).map_err(|e| {
            StorageError::CorruptRecord(format!(
                "{} {}: bad timestamp '{}': {}",
                self.symbol, self.trade_date, self.trade_timestamp, e
            ))
        })?;
        let data = PricePoint {
            trade_date,
            open: parse_price(&self, "open", &self.open)?,
            high: parse_price(&self, "high", &self.high)?,
            low: parse_price(&self, "low", &self.low)?,
            close: parse_price(&self, "close", &self.close)?,
            volume: self.volume,
        };
        Ok(SeriesRecord {
            symbol: self.symbol,
            data,
            last_updated: self.last_updated,
            source_reference: self.source_reference,
        })
    }
}

fn same_decimal(a: &str, b: &str) -> bool {
    match (Decimal::from_str(a), Decimal::from_str(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn parse_price(row: &PriceRecordDB, field: &str, value: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value).map_err(|e| {
        StorageError::CorruptRecord(format!(
            "{} {}: bad {} '{}': {}",
            row.symbol, row.trade_date, field, value, e
        ))
    })
}
