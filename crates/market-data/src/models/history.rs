/// A bar as the provider reported it, before validation.
///
/// Any price field may be missing or non-finite; the fetcher decides what to keep.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawBar {
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

/// Historical response for one instrument.
#[derive(Clone, Debug, Default)]
pub struct ProviderHistory {
    /// IANA zone of the exchange (e.g. "America/New_York"), when the provider reports one.
    pub timezone: Option<String>,
    pub bars: Vec<RawBar>,
}
