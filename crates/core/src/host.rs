//! Collaborator seam for the surface the tracker renders onto.
//!
//! The Discord layer implements [`ChannelHost`]; the core only issues
//! create/rename/reposition/delete/send requests through it and never
//! assumes they commit transactionally relative to each other.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ChannelId;

/// A channel as currently listed in a category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Channel identifier.
    pub id: ChannelId,
    /// Display name. The leading whitespace-delimited token carries the
    /// tracked symbol; there is no other link between a channel and its
    /// ticker across restarts.
    pub name: String,
    /// Dense ordinal position within the category, 0-based.
    pub position: usize,
}

/// A channel operation was rejected by the host.
#[derive(Error, Debug)]
#[error("channel host {operation} failed: {message}")]
pub struct HostError {
    /// Which operation failed ("create", "rename", ...).
    pub operation: &'static str,
    /// Host-supplied detail.
    pub message: String,
}

impl HostError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Operations on the externally owned channel surface.
///
/// All operations are fallible, asynchronous, and individually atomic from
/// the core's perspective.
#[async_trait]
pub trait ChannelHost: Send + Sync {
    /// Whether the driving connection is currently usable. Checked by the
    /// schedulers before each tick.
    fn is_connected(&self) -> bool;

    /// List the voice channels of a category in display order.
    async fn list_channels(&self, category: ChannelId) -> Result<Vec<ChannelInfo>, HostError>;

    /// Create a voice channel at the given position and return its id.
    async fn create_channel(
        &self,
        category: ChannelId,
        name: &str,
        position: usize,
    ) -> Result<ChannelId, HostError>;

    /// Rename an existing channel.
    async fn rename_channel(&self, channel: ChannelId, name: &str) -> Result<(), HostError>;

    /// Move an existing channel to a new position.
    async fn reposition_channel(&self, channel: ChannelId, position: usize)
        -> Result<(), HostError>;

    /// Delete a channel.
    async fn delete_channel(&self, channel: ChannelId) -> Result<(), HostError>;

    /// Post a text message to a channel. Fire-and-forget from the core's
    /// perspective; the result only feeds logging.
    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<(), HostError>;
}
