//! Channel label rendering and symbol extraction.
//!
//! A board channel's name is the only link between the channel and its
//! ticker: `"SYMBOL <icon> <price>"`. Parsing the symbol back out of a
//! rendered label is inherently fragile, so both directions live here as
//! pure functions and nowhere else.

use tickerdeck_market_data::{format_price, Quote};

use crate::config::Styles;

/// Render the display label for a quote: `"SYMBOL <icon> <price>"`.
///
/// The icon reflects the sign of the 1-hour change; a flat 0% counts as up.
pub fn channel_label(quote: &Quote, styles: &Styles) -> String {
    let icon = if quote.percent_change_1h >= 0.0 {
        &styles.price_up_icon
    } else {
        &styles.price_down_icon
    };
    format!("{} {} {}", quote.symbol, icon, format_price(quote.price_usd))
}

/// Extract the embedded symbol from a channel label: the first
/// whitespace-delimited token. Returns `None` for blank labels.
pub fn extract_symbol(label: &str) -> Option<&str> {
    label.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(symbol: &str, price: f64, change_1h: f64) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            slug: symbol.to_lowercase(),
            price_usd: price,
            percent_change_1h: change_1h,
            percent_change_24h: 0.0,
            percent_change_7d: 0.0,
            market_cap: 0.0,
            volume_24h: 0.0,
            last_updated: String::new(),
        }
    }

    #[test]
    fn test_label_shape() {
        let styles = Styles::default();
        assert_eq!(
            channel_label(&quote("BTC", 64123.77, 0.4), &styles),
            "BTC 📈 $64124"
        );
        assert_eq!(
            channel_label(&quote("DOGE", 0.123, -2.0), &styles),
            "DOGE 📉 $0.1230"
        );
    }

    #[test]
    fn test_flat_change_counts_as_up() {
        let styles = Styles::default();
        assert!(channel_label(&quote("BTC", 1.0, 0.0), &styles).contains("📈"));
    }

    #[test]
    fn test_extract_symbol_round_trips_labels() {
        let styles = Styles::default();
        let label = channel_label(&quote("ETH", 2512.3, 1.1), &styles);
        assert_eq!(extract_symbol(&label), Some("ETH"));
    }

    #[test]
    fn test_extract_symbol_edge_cases() {
        assert_eq!(extract_symbol(""), None);
        assert_eq!(extract_symbol("   "), None);
        assert_eq!(extract_symbol("general chat"), Some("general"));
    }
}
