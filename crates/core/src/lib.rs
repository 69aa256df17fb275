//! Guild-facing update services for the price board bot.
//!
//! This crate owns everything between the quote layer
//! ([`tickerdeck_market_data`]) and the chat platform: tenant configuration
//! types, the [`host::ChannelHost`] seam the platform layer implements,
//! the channel-board reconciliation planner, boundary-aligned scheduling,
//! and the two updater services that tie them together.
//!
//! ```text
//!  schedule::run_on_boundaries ──┬── update::VoiceBoardUpdater ──┐
//!                                └── update::MessageTickerUpdater┤
//!                                                                ▼
//!            reconcile::plan_full / apply_plan ──▶ host::ChannelHost
//! ```
//!
//! The embedder wires a `ChannelHost` implementation, a shared
//! [`config::Config`], and a shutdown channel into the updaters and runs
//! their loops for the lifetime of the process.

pub mod config;
pub mod errors;
pub mod host;
pub mod reconcile;
pub mod schedule;
pub mod update;

pub use config::{ChannelId, Config, GuildConfig, GuildId, SharedConfig, Styles};
pub use errors::UpdateError;
pub use host::{ChannelHost, ChannelInfo, HostError};
pub use reconcile::{
    apply_plan, channel_label, extract_symbol, plan_full, plan_insert, DesiredChannel, Edit,
};
pub use schedule::{epoch_now, run_on_boundaries, until_next_boundary, RECONNECT_BACKOFF};
pub use update::{
    CacheRegistry, GuildLocks, MessageTickerUpdater, VoiceBoardUpdater, MESSAGE_CADENCE_SECS,
    VOICE_CADENCE_SECS,
};
