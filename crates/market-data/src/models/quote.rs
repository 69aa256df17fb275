use serde::{Deserialize, Serialize};

/// A single cryptocurrency quote snapshot.
///
/// Built only from a parsed upstream response and never mutated afterwards.
/// Prices and percentages are plain `f64` values in USD terms; `market_cap`
/// is the ranking key used when ordering a ticker board.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quote {
    /// Ticker symbol, uppercase (e.g. "BTC"). Unique within a fetch batch.
    pub symbol: String,

    /// Human-readable asset name (e.g. "Bitcoin").
    pub name: String,

    /// URL slug used by the upstream site (e.g. "bitcoin").
    pub slug: String,

    /// Latest price in USD. Non-negative.
    pub price_usd: f64,

    /// Percent change over the last hour, signed.
    pub percent_change_1h: f64,

    /// Percent change over the last 24 hours, signed.
    pub percent_change_24h: f64,

    /// Percent change over the last 7 days, signed.
    pub percent_change_7d: f64,

    /// Market capitalization in USD. Non-negative; sort key for boards.
    pub market_cap: f64,

    /// 24-hour trading volume in USD.
    pub volume_24h: f64,

    /// Upstream timestamp string, treated as opaque.
    pub last_updated: String,
}

/// Sort quotes descending by market cap.
///
/// The sort is stable, so quotes with equal market caps keep their
/// upstream response order.
pub fn sort_by_market_cap(quotes: &mut [Quote]) {
    quotes.sort_by(|a, b| {
        b.market_cap
            .partial_cmp(&a.market_cap)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(symbol: &str, market_cap: f64) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            slug: symbol.to_lowercase(),
            price_usd: 1.0,
            percent_change_1h: 0.0,
            percent_change_24h: 0.0,
            percent_change_7d: 0.0,
            market_cap,
            volume_24h: 0.0,
            last_updated: String::new(),
        }
    }

    #[test]
    fn test_sort_highest_market_cap_first() {
        let mut quotes = vec![quote("SOL", 1.0), quote("BTC", 3.0), quote("ETH", 2.0)];
        sort_by_market_cap(&mut quotes);
        let symbols: Vec<&str> = quotes.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTC", "ETH", "SOL"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut quotes = vec![quote("AAA", 2.0), quote("BBB", 2.0), quote("CCC", 5.0)];
        sort_by_market_cap(&mut quotes);
        let symbols: Vec<&str> = quotes.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["CCC", "AAA", "BBB"]);
    }
}
