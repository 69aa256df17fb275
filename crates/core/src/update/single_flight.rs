//! Per-guild single-flight guard.
//!
//! A command-triggered update and a scheduled pass for the same guild must
//! never interleave their channel edits. Each guild gets one async mutex:
//! scheduled passes `try_lock` and skip a guild that is already being
//! updated; command paths `lock().await` so they serialize behind whatever
//! is running.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::warn;
use tokio::sync::Mutex as AsyncMutex;

use crate::config::GuildId;

/// Lazily created per-guild locks.
pub struct GuildLocks {
    locks: Mutex<HashMap<GuildId, Arc<AsyncMutex<()>>>>,
}

impl GuildLocks {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_map(&self) -> MutexGuard<'_, HashMap<GuildId, Arc<AsyncMutex<()>>>> {
        self.locks.lock().unwrap_or_else(|poisoned| {
            warn!("guild lock map mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// The lock for a guild, creating it on first use.
    pub fn for_guild(&self, guild: GuildId) -> Arc<AsyncMutex<()>> {
        self.lock_map().entry(guild).or_default().clone()
    }
}

impl Default for GuildLocks {
    fn default() -> Self {
        Self::new()
    }
}
