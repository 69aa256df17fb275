//! Message ticker updater.
//!
//! Posts periodic price messages and swap-rate messages to configured text
//! channels. Unlike the voice board there is no external state to
//! reconcile; each tick just sends.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::watch;

use tickerdeck_market_data::Quote;

use crate::config::{ChannelId, GuildConfig, SharedConfig};
use crate::errors::UpdateError;
use crate::host::ChannelHost;
use crate::schedule::{epoch_now, run_on_boundaries};
use crate::update::registry::CacheRegistry;

/// Scheduled cadence: every half hour, on the half hour.
pub const MESSAGE_CADENCE_SECS: u64 = 1800;

const CMC_CURRENCY_URL: &str = "https://coinmarketcap.com/currencies";

/// Drives the periodic price and ratio messages for every configured guild.
pub struct MessageTickerUpdater {
    host: Arc<dyn ChannelHost>,
    config: SharedConfig,
    caches: Arc<CacheRegistry>,
}

impl MessageTickerUpdater {
    pub fn new(host: Arc<dyn ChannelHost>, config: SharedConfig, caches: Arc<CacheRegistry>) -> Self {
        Self {
            host,
            config,
            caches,
        }
    }

    /// Run the scheduled loop until shutdown.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) {
        run_on_boundaries(
            MESSAGE_CADENCE_SECS,
            self.host.clone(),
            shutdown,
            "message tickers",
            || self.update_all(epoch_now()),
        )
        .await;
    }

    /// Post all configured messages for every guild. One guild's failure
    /// never stops the others.
    pub async fn update_all(&self, now: f64) -> Result<(), UpdateError> {
        let guilds: Vec<GuildConfig> = {
            let config = self.config.read().await;
            config.guilds.values().cloned().collect()
        };

        for guild in guilds {
            if let Err(err) = self.update_guild(&guild, now).await {
                warn!("message tickers failed for guild {}: {}", guild.id, err);
            }
        }
        Ok(())
    }

    async fn update_guild(&self, guild: &GuildConfig, now: f64) -> Result<(), UpdateError> {
        let Some(api_key) = guild.cmc_api_key.as_ref() else {
            return Ok(());
        };
        if guild.message_tickers.is_empty() && guild.ratio_tickers.is_empty() {
            return Ok(());
        }

        let cache = self.caches.for_guild(guild.id, api_key);

        if !guild.message_tickers.is_empty() {
            let symbols: Vec<String> = guild.message_tickers.keys().cloned().collect();
            let quotes = cache.fetch(&symbols, now).await;
            self.post_regular(&guild.message_tickers, &quotes).await;
        }

        for (pair, channel) in &guild.ratio_tickers {
            let Some((first, second)) = pair.split_once(':') else {
                warn!("guild {}: malformed ratio pair {:?}, skipping", guild.id, pair);
                continue;
            };
            let symbols = vec![first.to_string(), second.to_string()];
            let quotes = cache.fetch(&symbols, now).await;
            self.post_ratio(first, second, *channel, &quotes).await;
        }
        Ok(())
    }

    /// Send one price message per tracked symbol that resolved to a quote.
    async fn post_regular(&self, tickers: &HashMap<String, ChannelId>, quotes: &[Quote]) {
        let by_symbol: HashMap<&str, &Quote> =
            quotes.iter().map(|q| (q.symbol.as_str(), q)).collect();

        for (symbol, channel) in tickers {
            let Some(quote) = by_symbol.get(symbol.to_uppercase().as_str()) else {
                debug!("no quote for message ticker {}, skipping", symbol);
                continue;
            };
            let text = price_message(quote);
            if let Err(err) = self.host.send_message(*channel, &text).await {
                warn!("price message for {} not sent: {}", symbol, err);
            }
        }
    }

    /// Send one swap-rate message for a pair, if both legs resolved.
    async fn post_ratio(&self, first: &str, second: &str, channel: ChannelId, quotes: &[Quote]) {
        let by_symbol: HashMap<&str, &Quote> =
            quotes.iter().map(|q| (q.symbol.as_str(), q)).collect();
        let (Some(a), Some(b)) = (
            by_symbol.get(first.to_uppercase().as_str()),
            by_symbol.get(second.to_uppercase().as_str()),
        ) else {
            debug!("missing quote for ratio pair {}:{}, skipping", first, second);
            return;
        };
        if a.price_usd == 0.0 {
            warn!("zero price for {}, ratio {}:{} skipped", first, first, second);
            return;
        }

        let text = ratio_message(first, second, a, b);
        if let Err(err) = self.host.send_message(channel, &text).await {
            warn!("ratio message for {}:{} not sent: {}", first, second, err);
        }
    }
}

/// `The price of Bitcoin (BTC) is $64123.77 USD on [CMC](<...>)`.
fn price_message(quote: &Quote) -> String {
    format!(
        "The price of {} ({}) is ${:.2} USD on [CMC](<{}/{}/>)",
        quote.name, quote.symbol, quote.price_usd, CMC_CURRENCY_URL, quote.slug
    )
}

/// `The swap rate of ETH:BTC is 25:1 on [CMC](<...>)`.
///
/// The rate is truncated toward zero, not rounded; the link points at the
/// first leg of the pair.
fn ratio_message(first: &str, second: &str, a: &Quote, b: &Quote) -> String {
    let rate = (b.price_usd / a.price_usd) as i64;
    format!(
        "The swap rate of {}:{} is {}:1 on [CMC](<{}/{}/>)",
        first, second, rate, CMC_CURRENCY_URL, a.slug
    )
}
