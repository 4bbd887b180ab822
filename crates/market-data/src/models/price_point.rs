use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One trading-day bar, already validated and shifted to the market's zone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub trade_date: DateTime<FixedOffset>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

impl PricePoint {
    /// Local calendar date of the bar. Together with the symbol this is the storage key.
    pub fn calendar_date(&self) -> NaiveDate {
        self.trade_date.date_naive()
    }
}
