//! Error types and failure classification for quote fetching.
//!
//! This module provides:
//! - [`QuoteError`]: The error enum for all upstream quote operations
//! - [`FailureClass`]: Classification for determining caller behavior

mod class;

pub use class::FailureClass;

use thiserror::Error;

/// Errors that can occur while fetching quotes from the upstream API.
///
/// Each variant is classified into a [`FailureClass`] via the
/// [`class`](Self::class) method, which determines how the quote cache
/// handles the failure.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// The upstream throttled the request (HTTP 429).
    /// The client has already served the mandatory cooldown by the time
    /// this error reaches a caller.
    #[error("rate limited by upstream")]
    RateLimited,

    /// The request timed out before the upstream answered.
    #[error("upstream request timed out")]
    Timeout,

    /// The upstream answered with a non-success, non-429 status.
    #[error("upstream returned HTTP {status}: {body}")]
    UpstreamStatus {
        /// HTTP status code of the response.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body did not match the expected shape.
    ///
    /// Never folded into an empty result: an empty result would read as
    /// "these symbols do not exist" and could cause live channels to be
    /// dropped downstream.
    #[error("unexpected response shape: {message}")]
    Parse {
        /// Description of the parse failure.
        message: String,
    },

    /// A transport-level fault occurred.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl QuoteError {
    /// Returns the failure classification for this error.
    ///
    /// - [`FailureClass::RateLimited`]: throttled; a cooldown was served
    /// - [`FailureClass::Transient`]: retry later, stale data is acceptable
    /// - [`FailureClass::Parse`]: the response was unusable, not retryable
    ///   as-is
    pub fn class(&self) -> FailureClass {
        match self {
            Self::RateLimited => FailureClass::RateLimited,
            Self::Timeout | Self::UpstreamStatus { .. } | Self::Network(_) => {
                FailureClass::Transient
            }
            Self::Parse { .. } => FailureClass::Parse,
        }
    }
}
