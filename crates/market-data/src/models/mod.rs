//! Market data models
//!
//! - `market` - Market selector and its presentation attributes
//! - `period` - Look-back windows
//! - `instrument` - Resolved provider identifiers
//! - `history` - Raw provider bars
//! - `price_point` - Validated daily bars

mod history;
mod instrument;
mod market;
mod period;
mod price_point;

pub use history::{ProviderHistory, RawBar};
pub use instrument::ResolvedSymbol;
pub use market::Market;
pub use period::Period;
pub use price_point::PricePoint;
