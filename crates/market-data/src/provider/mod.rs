//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `HistoryProvider` trait that all providers implement
//! - Rate limiting configuration
//! - The Yahoo Finance implementation

mod capabilities;
mod traits;

pub mod yahoo;

pub use capabilities::RateLimit;
pub use traits::HistoryProvider;
