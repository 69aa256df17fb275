//! CoinMarketCap quote provider implementation.
//!
//! Fetches latest quotes via the `/v1/cryptocurrency/quotes/latest`
//! endpoint, batching all requested symbols into a single request.
//! Authentication is a per-tenant API key sent as a request header.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::QuoteError;
use crate::models::Quote;

use super::QuoteProvider;

const BASE_URL: &str = "https://pro-api.coinmarketcap.com";
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// Cooldown served locally after the upstream answers 429, before the
/// error is surfaced to the caller.
const RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(60);

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /v1/cryptocurrency/quotes/latest.
///
/// `data` maps each resolved symbol to its listing; symbols the upstream
/// could not resolve are simply absent.
#[derive(Debug, Deserialize)]
struct QuotesResponse {
    data: HashMap<String, Listing>,
}

/// One listing entry under `data`.
#[derive(Debug, Deserialize)]
struct Listing {
    /// Ticker symbol, uppercase
    symbol: String,
    /// Asset name
    #[serde(default)]
    name: String,
    /// URL slug on coinmarketcap.com
    #[serde(default)]
    slug: String,
    /// Per-currency quote block
    quote: QuoteBlock,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(rename = "USD")]
    usd: UsdQuote,
}

/// The nested USD quote object.
///
/// Numeric fields default to zero when the upstream omits them, matching
/// how sparse listings are served for thinly traded assets.
#[derive(Debug, Deserialize)]
struct UsdQuote {
    #[serde(default)]
    price: f64,
    #[serde(default)]
    percent_change_1h: f64,
    #[serde(default)]
    percent_change_24h: f64,
    #[serde(default)]
    percent_change_7d: f64,
    #[serde(default)]
    market_cap: f64,
    #[serde(default)]
    volume_24h: f64,
    #[serde(default)]
    last_updated: String,
}

impl QuotesResponse {
    fn into_quotes(self) -> Vec<Quote> {
        self.data
            .into_values()
            .map(|listing| Quote {
                symbol: listing.symbol,
                name: listing.name,
                slug: listing.slug,
                price_usd: listing.quote.usd.price,
                percent_change_1h: listing.quote.usd.percent_change_1h,
                percent_change_24h: listing.quote.usd.percent_change_24h,
                percent_change_7d: listing.quote.usd.percent_change_7d,
                market_cap: listing.quote.usd.market_cap,
                volume_24h: listing.quote.usd.volume_24h,
                last_updated: listing.quote.usd.last_updated,
            })
            .collect()
    }
}

// ============================================================================
// CmcProvider
// ============================================================================

/// CoinMarketCap quote provider.
///
/// One instance per API key; the key belongs to a single tenant and must
/// not be shared across tenants.
pub struct CmcProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CmcProvider {
    /// Create a provider for the given API key.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL.to_string())
    }

    /// Create a provider pointed at a custom base URL (used in tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        // The builder only sets a timeout; falling back to a default
        // client here would silently drop it.
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client with only a timeout configured");

        Self {
            client,
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl QuoteProvider for CmcProvider {
    async fn quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, QuoteError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/cryptocurrency/quotes/latest", self.base_url);
        let symbol_list = symbols.join(",");

        debug!("requesting quotes for {}", symbol_list);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("symbol", symbol_list.as_str()), ("convert", "USD")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QuoteError::Timeout
                } else {
                    QuoteError::Network(e)
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(
                "upstream rate limit hit, cooling down for {}s",
                RATE_LIMIT_COOLDOWN.as_secs()
            );
            tokio::time::sleep(RATE_LIMIT_COOLDOWN).await;
            return Err(QuoteError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuoteError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let payload: QuotesResponse = response.json().await.map_err(|e| QuoteError::Parse {
            message: e.to_string(),
        })?;

        Ok(payload.into_quotes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = r#"{
        "data": {
            "BTC": {
                "symbol": "BTC",
                "name": "Bitcoin",
                "slug": "bitcoin",
                "quote": {
                    "USD": {
                        "price": 64123.77,
                        "percent_change_1h": 0.42,
                        "percent_change_24h": -1.3,
                        "percent_change_7d": 5.1,
                        "market_cap": 1260000000000.0,
                        "volume_24h": 31000000000.0,
                        "last_updated": "2024-05-01T12:00:00.000Z"
                    }
                }
            }
        }
    }"#;

    #[test]
    fn test_construction_keeps_the_request_timeout() {
        // Building the timeout-configured client must not panic or fall
        // back to an unconfigured one.
        let provider = CmcProvider::new("key".to_string());
        assert_eq!(provider.base_url, BASE_URL);
    }

    #[test]
    fn test_parse_sample_response() {
        let payload: QuotesResponse = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
        let quotes = payload.into_quotes();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].symbol, "BTC");
        assert_eq!(quotes[0].slug, "bitcoin");
        assert_eq!(quotes[0].price_usd, 64123.77);
        assert_eq!(quotes[0].market_cap, 1260000000000.0);
        assert_eq!(quotes[0].last_updated, "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn test_requested_symbols_may_be_absent() {
        // The upstream lists only the symbols it resolved; an empty data
        // map is a valid (if useless) answer, not a parse failure.
        let payload: QuotesResponse = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        assert!(payload.into_quotes().is_empty());
    }

    #[test]
    fn test_missing_data_field_is_a_parse_failure() {
        let result: Result<QuotesResponse, _> =
            serde_json::from_str(r#"{"status": {"error_code": 0}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_sparse_usd_quote_defaults_to_zero() {
        let payload: QuotesResponse = serde_json::from_str(
            r#"{"data": {"XYZ": {"symbol": "XYZ", "quote": {"USD": {"price": 0.5}}}}}"#,
        )
        .unwrap();
        let quotes = payload.into_quotes();
        assert_eq!(quotes[0].price_usd, 0.5);
        assert_eq!(quotes[0].market_cap, 0.0);
        assert_eq!(quotes[0].name, "");
    }
}
