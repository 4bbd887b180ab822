use std::collections::HashSet;

/// Split a comma-delimited symbol list into normalized tickers.
///
/// Entries are trimmed and uppercased, blanks are dropped and repeats keep
/// their first position.
pub fn parse_symbol_list(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
