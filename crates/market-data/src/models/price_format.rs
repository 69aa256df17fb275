//! Display formatting for USD prices.

/// Format a USD price for display.
///
/// Precision scales with magnitude so that sub-cent assets stay readable
/// while large-cap prices stay compact:
///
/// - `< $0.01` → 6 decimal places
/// - `< $1` → 4 decimal places
/// - `< $1000` → 2 decimal places
/// - otherwise → 0 decimal places
///
/// Pure function of the input: identical inputs always produce identical
/// output.
pub fn format_price(price: f64) -> String {
    if price < 0.01 {
        format!("${:.6}", price)
    } else if price < 1.0 {
        format!("${:.4}", price)
    } else if price < 1000.0 {
        format!("${:.2}", price)
    } else {
        format!("${:.0}", price)
    }
}
