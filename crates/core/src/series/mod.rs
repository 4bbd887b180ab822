//! Durable per-symbol price series.

mod model;
mod store;

pub use model::{PointFailure, SeriesRecord, WriteSummary};
pub use store::SeriesStore;
