//! Board reconciliation: planning and applying channel edits.
//!
//! This module contains:
//! - Pure label rendering/parsing (`label`)
//! - The pure edit planner (`plan`)
//! - The applier that issues a plan against a [`ChannelHost`]

mod label;
mod plan;

pub use label::{channel_label, extract_symbol};
pub use plan::{plan_full, plan_insert, DesiredChannel, Edit};

use log::warn;

use crate::config::ChannelId;
use crate::host::{ChannelHost, HostError};

/// Apply a plan against the host, in order.
///
/// A rejected edit is logged and skipped, never retried within the pass:
/// the next scheduled full pass self-heals whatever was left partially
/// applied.
pub async fn apply_plan(host: &dyn ChannelHost, category: ChannelId, edits: &[Edit]) {
    for edit in edits {
        if let Err(err) = apply_edit(host, category, edit).await {
            warn!("channel edit {:?} failed, continuing: {}", edit, err);
        }
    }
}

async fn apply_edit(
    host: &dyn ChannelHost,
    category: ChannelId,
    edit: &Edit,
) -> Result<(), HostError> {
    match edit {
        Edit::Create { name, position } => {
            host.create_channel(category, name, *position).await?;
        }
        Edit::Rename { id, name } => host.rename_channel(*id, name).await?,
        Edit::Move { id, position } => host.reposition_channel(*id, *position).await?,
        Edit::Delete { id } => host.delete_channel(*id).await?,
    }
    Ok(())
}
