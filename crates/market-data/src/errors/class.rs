/// Classification of upstream quote failures.
///
/// The quote cache consults this when a refresh fails to decide how the
/// failure is reported while it degrades to cached data; embedders can use
/// it to choose between retrying and rejecting input.
///
/// | Class | Stale fallback acceptable? | Retrying the same request helps? |
/// |-------|---------------------------|----------------------------------|
/// | `RateLimited` | Yes | Yes, after the cooldown |
/// | `Transient` | Yes | Yes |
/// | `Parse` | Yes | No, the response shape is wrong |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureClass {
    /// The upstream throttled the request. A fixed cooldown has already
    /// been served before the error surfaced.
    RateLimited,

    /// Network fault, timeout, or upstream server error. The request was
    /// valid; a later retry may succeed.
    Transient,

    /// The upstream answered but the payload was unusable. Surfaced as an
    /// error rather than an empty result.
    Parse,
}
