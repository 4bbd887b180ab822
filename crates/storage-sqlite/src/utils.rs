//! Helpers for working around SQLite limits.

/// Largest slice bound into a single `IN (...)` clause.
///
/// SQLite caps host parameters per statement (historically 999); 500 leaves
/// room for the other filters in the query.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Split `items` into slices small enough for one `IN (...)` query each.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}
