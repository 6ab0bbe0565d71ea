//! Tag reconciliation between the live remote tag set and the desired one.
//!
//! Live tags always come from the remote listing, never from the
//! orchestrator's previous-state tags, so tags changed out of band are
//! brought back in line on the next managed update.

use std::collections::{BTreeSet, HashSet};

use fleetmetric_core::is_system_tag;
use fleetmetric_remote::{FleetMetricClient, RemoteError, RemoteTag};
use metrics::counter;
use tracing::info;

use crate::paginate::list_all_tags;

/// Calls needed to move a resource's tags from live to desired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDelta {
    /// Tags to attach. Attaching overwrites by key.
    pub attach: BTreeSet<RemoteTag>,
    pub detach_keys: BTreeSet<String>,
}

impl TagDelta {
    pub fn is_empty(&self) -> bool {
        self.attach.is_empty() && self.detach_keys.is_empty()
    }
}

/// Compute the attach/detach delta.
///
/// System-namespaced live tags are never proposed for detachment. A key
/// present on both sides with a different value yields one attach and no
/// detach.
pub fn diff(live: &HashSet<RemoteTag>, desired: &HashSet<RemoteTag>) -> TagDelta {
    let desired_keys: HashSet<&str> = desired.iter().map(|t| t.key.as_str()).collect();
    let detach_keys = live
        .iter()
        .filter(|t| !is_system_tag(&t.key))
        .filter(|t| !desired_keys.contains(t.key.as_str()))
        .map(|t| t.key.clone())
        .collect();
    let attach = desired.iter().filter(|t| !live.contains(*t)).cloned().collect();
    TagDelta { attach, detach_keys }
}

/// List the live tags of `resource_arn`, diff against `desired` and issue
/// only the attach/detach calls that are needed.
pub async fn sync_tags(
    client: &dyn FleetMetricClient,
    resource_arn: &str,
    desired: &HashSet<RemoteTag>,
) -> Result<TagDelta, RemoteError> {
    let live: HashSet<RemoteTag> = list_all_tags(client, resource_arn).await?.into_iter().collect();
    let delta = diff(&live, desired);

    if !delta.attach.is_empty() {
        client.tag_resource(resource_arn, delta.attach.iter().cloned().collect()).await?;
        counter!("fleetmetric_tag_calls_total", 1, "call" => "tag");
        info!(arn = %resource_arn, count = delta.attach.len(), "attached tags");
    }
    if !delta.detach_keys.is_empty() {
        client.untag_resource(resource_arn, delta.detach_keys.iter().cloned().collect()).await?;
        counter!("fleetmetric_tag_calls_total", 1, "call" => "untag");
        info!(arn = %resource_arn, count = delta.detach_keys.len(), "detached tags");
    }
    Ok(delta)
}
