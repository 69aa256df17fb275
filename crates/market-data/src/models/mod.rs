//! Data models for upstream quote data.

mod price_format;
mod quote;

pub use price_format::format_price;
pub use quote::{sort_by_market_cap, Quote};
