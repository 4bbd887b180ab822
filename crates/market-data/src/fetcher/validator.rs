//! Bar validation at the provider boundary.
//!
//! Turns loosely typed [`RawBar`]s into [`PricePoint`]s. Hard failures reject
//! the bar; soft issues are logged and the bar is kept.

use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use log::warn;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{PricePoint, RawBar};

fn invalid(message: String) -> MarketDataError {
    MarketDataError::ValidationFailed { message }
}

fn required_price(name: &str, value: Option<f64>) -> Result<Decimal, MarketDataError> {
    let value = value.ok_or_else(|| invalid(format!("Missing {} price", name)))?;
    let price = Decimal::from_f64_retain(value)
        .ok_or_else(|| invalid(format!("Failed to convert {} price {} to Decimal", name, value)))?;
    if price < Decimal::ZERO {
        return Err(invalid(format!("Negative {} price: {}", name, price)));
    }
    Ok(price)
}

/// Validate one bar and stamp it in `zone`.
pub fn to_price_point(bar: &RawBar, zone: Tz) -> Result<PricePoint, MarketDataError> {
    let instant = Utc
        .timestamp_opt(bar.timestamp, 0)
        .single()
        .ok_or_else(|| invalid(format!("Invalid timestamp: {}", bar.timestamp)))?;

    let open = required_price("open", bar.open)?;
    let high = required_price("high", bar.high)?;
    let low = required_price("low", bar.low)?;
    let close = required_price("close", bar.close)?;

    if high < low {
        return Err(invalid(format!(
            "High ({}) is less than Low ({})",
            high, low
        )));
    }

    let volume = bar
        .volume
        .ok_or_else(|| invalid("Missing volume".to_string()))
        .and_then(|v| i64::try_from(v).map_err(|_| invalid(format!("Volume out of range: {}", v))))?;

    if open < low || open > high || close < low || close > high {
        warn!(
            "Bar at {} has open/close outside High/Low range ({}-{})",
            instant, low, high
        );
    }

    Ok(PricePoint {
        trade_date: instant.with_timezone(&zone).fixed_offset(),
        open,
        high,
        low,
        close,
        volume,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use rust_decimal_macros::dec;

    fn bar(timestamp: i64) -> RawBar {
        RawBar {
            timestamp,
            open: Some(10.5),
            high: Some(11.0),
            low: Some(10.0),
            close: Some(10.75),
            volume: Some(1_000),
        }
    }

    #[test]
    fn test_valid_bar_converts() {
        // 2024-01-02 03:45 UTC is the NSE open
        let point = to_price_point(&bar(1_704_167_100), chrono_tz::Asia::Kolkata).unwrap();
        assert_eq!(point.trade_date.hour(), 9);
        assert_eq!(point.trade_date.minute(), 15);
        assert_eq!(point.trade_date.offset().local_minus_utc(), 5 * 3600 + 1800);
        assert_eq!(point.calendar_date().day(), 2);
        assert_eq!(point.close, dec!(10.75));
        assert_eq!(point.volume, 1_000);
    }

    #[test]
    fn test_missing_close_is_rejected() {
        let mut raw = bar(1_704_167_100);
        raw.close = None;
        let err = to_price_point(&raw, chrono_tz::UTC).unwrap_err();
        assert!(err.to_string().contains("close"));
    }

    #[test]
    fn test_missing_volume_is_rejected() {
        let mut raw = bar(1_704_167_100);
        raw.volume = None;
        assert!(to_price_point(&raw, chrono_tz::UTC).is_err());
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut raw = bar(1_704_167_100);
        raw.high = Some(9.0);
        assert!(to_price_point(&raw, chrono_tz::UTC).is_err());
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let mut raw = bar(1_704_167_100);
        raw.low = Some(-1.0);
        assert!(to_price_point(&raw, chrono_tz::UTC).is_err());
    }
}
