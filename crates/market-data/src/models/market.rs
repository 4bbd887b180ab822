use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Market selector for a batch of symbols.
///
/// `Us` is the default market: symbols are passed to the provider unchanged and
/// timestamps stay in the exchange's native zone. `Nse` is the alternate market:
/// symbols get the `.NS` suffix and timestamps are shifted to Asia/Kolkata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    #[default]
    Us,
    Nse,
}

impl Market {
    pub const ALL: [Market; 2] = [Market::Us, Market::Nse];

    /// Wire code used in requests and source references.
    pub fn code(&self) -> &'static str {
        match self {
            Market::Us => "US",
            Market::Nse => "NSE",
        }
    }

    /// Lenient parse. Unknown codes fall back to the default market.
    pub fn from_code(code: &str) -> Self {
        code.parse().unwrap_or_default()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Market::Us => "US Market",
            Market::Nse => "Indian Market (NSE)",
        }
    }

    /// Provider symbol suffix, if the market needs one.
    pub fn exchange_suffix(&self) -> Option<&'static str> {
        match self {
            Market::Us => None,
            Market::Nse => Some(".NS"),
        }
    }

    pub fn currency(&self) -> &'static str {
        match self {
            Market::Us => "USD",
            Market::Nse => "INR",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Market::Us => "US Stock Prices",
            Market::Nse => "Indian Stock Prices",
        }
    }

    /// Heading used on rendered charts.
    pub fn chart_heading(&self) -> &'static str {
        match self {
            Market::Us => "US Stock Prices",
            Market::Nse => "Indian Stock Prices (NSE)",
        }
    }

    /// Zone every timestamp is shifted to. `None` keeps the provider's native zone.
    pub fn reference_timezone(&self) -> Option<Tz> {
        match self {
            Market::Us => None,
            Market::Nse => Some(chrono_tz::Asia::Kolkata),
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Market {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Market::Us),
            "NSE" => Ok(Market::Nse),
            other => Err(MarketDataError::ValidationFailed {
                message: format!("Unknown market: {}", other),
            }),
        }
    }
}
