//! Error types for the update services.

use thiserror::Error;

use tickerdeck_market_data::QuoteError;

use crate::host::HostError;

/// Errors surfaced from an update pass.
///
/// Individual channel edits inside a reconciliation pass are logged and
/// skipped rather than surfaced here; a partially applied pass self-heals
/// on the next scheduled tick. This type covers the failures that abort a
/// guild's pass outright.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// A quote validation fetch failed.
    #[error("quote fetch failed: {0}")]
    Quote(#[from] QuoteError),

    /// A required host operation failed.
    #[error("host operation failed: {0}")]
    Host(#[from] HostError),
}
