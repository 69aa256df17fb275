use async_trait::async_trait;

use crate::errors::QuoteError;
use crate::models::Quote;

/// Trait for upstream quote sources.
///
/// The cache layer talks to the upstream only through this seam, which
/// keeps it testable against scripted providers.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch the latest quotes for a batch of symbols in one request.
    ///
    /// Symbols the upstream cannot resolve are simply absent from the
    /// result; they are never synthesized. An empty input yields an empty
    /// result without any network traffic.
    async fn quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, QuoteError>;
}
