use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Look-back window for a historical request. Bars are always daily.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[default]
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "2mo")]
    TwoMonths,
    #[serde(rename = "3mo")]
    ThreeMonths,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::TwoMonths,
        Period::ThreeMonths,
    ];

    /// Range string understood by the provider.
    pub fn as_range(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::TwoMonths => "2mo",
            Period::ThreeMonths => "3mo",
        }
    }

    pub fn interval(&self) -> &'static str {
        "1d"
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::OneDay => "1 Day",
            Period::FiveDays => "5 Days",
            Period::OneMonth => "1 Month",
            Period::TwoMonths => "2 Months",
            Period::ThreeMonths => "3 Months",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_range())
    }
}

impl FromStr for Period {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.as_range() == normalized)
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!("Unknown period: {}", s),
            })
    }
}
