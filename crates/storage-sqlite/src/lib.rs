//! SQLite storage implementation for StockView.
//!
//! The only crate in the workspace that depends on Diesel. It implements the
//! [`SeriesStore`](stockview_core::series::SeriesStore) trait from
//! `stockview-core` and owns:
//! - connection pooling and SQLite pragmas
//! - embedded Diesel migrations
//! - the single writer actor that serializes all writes
//! - database-specific row types
//!
//! ```text
//! core (pipeline) ──SeriesStore──► storage-sqlite (this crate) ──► SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod series;
mod utils;

pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};
pub use errors::{IntoCore, StorageError};
pub use series::SeriesRepository;

pub use stockview_core::errors::{DatabaseError, Error, Result};
