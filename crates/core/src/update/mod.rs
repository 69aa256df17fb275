//! The two long-lived update services and their shared plumbing.

mod messages;
mod registry;
mod single_flight;
mod voice;

pub use messages::{MessageTickerUpdater, MESSAGE_CADENCE_SECS};
pub use registry::CacheRegistry;
pub use single_flight::GuildLocks;
pub use voice::{VoiceBoardUpdater, VOICE_CADENCE_SECS};
