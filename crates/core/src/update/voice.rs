//! Voice-channel price board updater.
//!
//! Renders each guild's tracked tickers as a category of voice channels,
//! ordered by market cap. The scheduled pass runs a full reconciliation;
//! ticker add/remove commands use O(1) incremental paths that touch only
//! the affected channel and leave drift for the next full pass.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::watch;

use tickerdeck_market_data::sort_by_market_cap;

use crate::config::{GuildConfig, GuildId, SharedConfig, Styles};
use crate::errors::UpdateError;
use crate::host::ChannelHost;
use crate::reconcile::{
    apply_plan, channel_label, extract_symbol, plan_full, plan_insert, DesiredChannel,
};
use crate::schedule::{epoch_now, run_on_boundaries};
use crate::update::registry::CacheRegistry;
use crate::update::single_flight::GuildLocks;

/// Scheduled full-pass cadence: hourly, on the hour.
pub const VOICE_CADENCE_SECS: u64 = 3600;

/// Drives the voice-channel price boards for every configured guild.
pub struct VoiceBoardUpdater {
    host: Arc<dyn ChannelHost>,
    config: SharedConfig,
    styles: Styles,
    caches: Arc<CacheRegistry>,
    locks: GuildLocks,
}

impl VoiceBoardUpdater {
    pub fn new(
        host: Arc<dyn ChannelHost>,
        config: SharedConfig,
        styles: Styles,
        caches: Arc<CacheRegistry>,
    ) -> Self {
        Self {
            host,
            config,
            styles,
            caches,
            locks: GuildLocks::new(),
        }
    }

    /// Run the scheduled loop until shutdown.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) {
        run_on_boundaries(
            VOICE_CADENCE_SECS,
            self.host.clone(),
            shutdown,
            "voice board",
            || self.update_all(epoch_now()),
        )
        .await;
    }

    /// Full reconciliation pass over every configured guild.
    ///
    /// A guild still busy from a previous invocation is skipped, and one
    /// guild's failure never stops the others.
    pub async fn update_all(&self, now: f64) -> Result<(), UpdateError> {
        let guilds: Vec<GuildConfig> = {
            let config = self.config.read().await;
            config.guilds.values().cloned().collect()
        };

        for guild in guilds {
            let lock = self.locks.for_guild(guild.id);
            let Ok(_guard) = lock.try_lock() else {
                debug!("guild {} update already in flight, skipping", guild.id);
                continue;
            };
            if let Err(err) = self.update_guild(&guild, now).await {
                warn!("voice board update failed for guild {}: {}", guild.id, err);
            }
        }
        Ok(())
    }

    /// Command-triggered full pass for one guild, serialized behind any
    /// in-flight update for the same guild.
    pub async fn force_update(&self, guild_id: GuildId) -> Result<(), UpdateError> {
        let Some(guild) = self.guild_snapshot(guild_id).await else {
            return Ok(());
        };
        let lock = self.locks.for_guild(guild_id);
        let _guard = lock.lock().await;
        self.update_guild(&guild, epoch_now()).await
    }

    async fn guild_snapshot(&self, guild_id: GuildId) -> Option<GuildConfig> {
        self.config.read().await.guilds.get(&guild_id).cloned()
    }

    async fn update_guild(&self, guild: &GuildConfig, now: f64) -> Result<(), UpdateError> {
        let (Some(category), Some(api_key)) = (guild.update_category, guild.cmc_api_key.as_ref())
        else {
            return Ok(());
        };
        if guild.voice_tickers.is_empty() {
            return Ok(());
        }

        let cache = self.caches.for_guild(guild.id, api_key);
        let mut quotes = cache.fetch(&guild.voice_tickers, now).await;
        if quotes.is_empty() {
            // Total upstream failure with no fallback; leave the board
            // untouched rather than tearing it down.
            debug!("no quotes for guild {}, leaving board as is", guild.id);
            return Ok(());
        }
        sort_by_market_cap(&mut quotes);

        let tracked: HashSet<String> = guild
            .voice_tickers
            .iter()
            .map(|s| s.to_uppercase())
            .collect();
        let desired: Vec<DesiredChannel> = quotes
            .iter()
            .filter(|quote| tracked.contains(&quote.symbol))
            .map(|quote| DesiredChannel::new(quote.symbol.clone(), channel_label(quote, &self.styles)))
            .collect();
        let pending: HashSet<String> = tracked
            .iter()
            .filter(|symbol| !desired.iter().any(|entry| &entry.symbol == *symbol))
            .cloned()
            .collect();
        if !pending.is_empty() {
            debug!(
                "guild {}: no quote yet for {:?}, leaving their channels alone",
                guild.id, pending
            );
        }

        let existing = self.host.list_channels(category).await?;
        let plan = plan_full(&desired, &tracked, &pending, &existing);
        apply_plan(self.host.as_ref(), category, &plan).await;
        Ok(())
    }

    /// Incrementally add one ticker's channel.
    ///
    /// Call after the symbol has been added to the guild's tracked list.
    /// Quotes are fetched for the entire tracked set so the newcomer's
    /// market-cap rank is known; the new channel is created at the end and
    /// then moved once into place. No other channel is renamed or moved —
    /// any drift is corrected by the next scheduled full pass.
    pub async fn add_ticker(&self, guild_id: GuildId, symbol: &str) -> Result<(), UpdateError> {
        let symbol = symbol.to_uppercase();
        let Some(guild) = self.guild_snapshot(guild_id).await else {
            return Ok(());
        };
        let (Some(category), Some(api_key)) = (guild.update_category, guild.cmc_api_key.as_ref())
        else {
            return Ok(());
        };

        let lock = self.locks.for_guild(guild_id);
        let _guard = lock.lock().await;

        let cache = self.caches.for_guild(guild_id, api_key);
        let mut quotes = cache.fetch(&guild.voice_tickers, epoch_now()).await;
        if quotes.is_empty() {
            return Ok(());
        }
        sort_by_market_cap(&mut quotes);

        let Some((rank, quote)) = plan_insert(&quotes, &symbol) else {
            debug!("no quote for {} yet, channel deferred to next pass", symbol);
            return Ok(());
        };
        let name = channel_label(quote, &self.styles);

        let existing = self.host.list_channels(category).await?;
        let channel = self
            .host
            .create_channel(category, &name, existing.len())
            .await?;
        if rank + 1 < quotes.len() {
            self.host.reposition_channel(channel, rank).await?;
        }
        info!(
            "added voice channel for {} at rank {} in guild {}",
            symbol, rank, guild_id
        );
        Ok(())
    }

    /// Incrementally remove one ticker's channel.
    ///
    /// Deletes the single channel whose embedded symbol matches; nothing
    /// else is touched.
    pub async fn remove_ticker(&self, guild_id: GuildId, symbol: &str) -> Result<(), UpdateError> {
        let symbol = symbol.to_uppercase();
        let Some(guild) = self.guild_snapshot(guild_id).await else {
            return Ok(());
        };
        let Some(category) = guild.update_category else {
            return Ok(());
        };

        let lock = self.locks.for_guild(guild_id);
        let _guard = lock.lock().await;

        let existing = self.host.list_channels(category).await?;
        for info in &existing {
            if extract_symbol(&info.name) == Some(symbol.as_str()) {
                self.host.delete_channel(info.id).await?;
                info!("removed voice channel for {} in guild {}", symbol, guild_id);
                return Ok(());
            }
        }
        debug!("no voice channel found for {} in guild {}", symbol, guild_id);
        Ok(())
    }

    /// Check a symbol against the upstream without touching the cache.
    ///
    /// `Ok(true)` means the upstream knows the symbol, `Ok(false)` means
    /// it does not, and `Err` means the check itself failed and the caller
    /// should retry later rather than reject the symbol.
    pub async fn validate_ticker(
        &self,
        guild_id: GuildId,
        symbol: &str,
    ) -> Result<bool, UpdateError> {
        let symbol = symbol.to_uppercase();
        let Some(guild) = self.guild_snapshot(guild_id).await else {
            return Ok(false);
        };
        let Some(api_key) = guild.cmc_api_key.as_ref() else {
            return Ok(false);
        };
        let cache = self.caches.for_guild(guild_id, api_key);
        let quotes = cache.fetch_no_cache(&[symbol.clone()]).await?;
        Ok(quotes.iter().any(|quote| quote.symbol == symbol))
    }
}
