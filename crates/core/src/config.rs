//! Tenant configuration model.
//!
//! Configuration is owned by the embedding bot layer, which loads, mutates,
//! and persists it. This crate only reads it, through a shared
//! [`SharedConfig`] handle that both update loops borrow.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Discord guild (tenant) identifier.
pub type GuildId = u64;

/// Discord channel or category identifier.
pub type ChannelId = u64;

/// Per-guild tracker configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GuildConfig {
    /// The guild this configuration belongs to.
    pub id: GuildId,

    /// Category that holds the price board voice channels.
    #[serde(default)]
    pub update_category: Option<ChannelId>,

    /// The guild's own CoinMarketCap API key. Every tenant brings its own
    /// credential, so every tenant gets its own cache and rate limiter.
    #[serde(default)]
    pub cmc_api_key: Option<String>,

    /// Symbols shown on the voice-channel price board.
    #[serde(default)]
    pub voice_tickers: Vec<String>,

    /// Symbol → channel for periodic price messages.
    #[serde(default)]
    pub message_tickers: HashMap<String, ChannelId>,

    /// `"T1:T2"` pair → channel for periodic swap-rate messages.
    #[serde(default)]
    pub ratio_tickers: HashMap<String, ChannelId>,
}

/// Configuration for every guild under the tracker's control.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Per-guild configuration, indexed by guild id.
    #[serde(default)]
    pub guilds: HashMap<GuildId, GuildConfig>,
}

/// Shared read handle over the configuration. The embedder holds the same
/// handle for writes; the update loops only ever read.
pub type SharedConfig = Arc<RwLock<Config>>;

/// Display styling for channel labels.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Styles {
    /// Icon shown when the 1h change is non-negative.
    pub price_up_icon: String,
    /// Icon shown when the 1h change is negative.
    pub price_down_icon: String,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            price_up_icon: "📈".to_string(),
            price_down_icon: "📉".to_string(),
        }
    }
}
