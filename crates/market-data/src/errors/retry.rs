/// Classification for retry policy.
///
/// Used by the fetcher to decide whether a failed provider call is worth repeating.
///
/// | Class | Retry? |
/// |-------|--------|
/// | `Never` | No, the failure is terminal for this request |
/// | `WithBackoff` | Yes, after an exponentially growing delay |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - unknown symbol, empty window, or invalid payload.
    Never,

    /// Transient error like a rate limit, timeout or dropped connection.
    WithBackoff,
}
