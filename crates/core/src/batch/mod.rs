//! Batch pipeline: parse a symbol list, then fetch and persist every symbol.

mod model;
mod orchestrator;
mod symbols;

pub use model::{
    presentation_labels, BatchEntry, BatchResult, PresentationLabels, RunOutcome, SymbolOutcome,
};
pub use orchestrator::{BatchOrchestrator, DEFAULT_MAX_CONCURRENCY};
pub use symbols::parse_symbol_list;
