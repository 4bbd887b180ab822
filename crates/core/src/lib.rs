//! StockView Core - batch pipeline, storage traits and presentation.
//!
//! This crate is database-agnostic: it defines the [`series::SeriesStore`]
//! trait implemented by the `storage-sqlite` crate and drives it from the
//! [`batch::BatchOrchestrator`].

pub mod batch;
pub mod chart;
pub mod errors;
pub mod series;

pub use errors::Error;
pub use errors::Result;
