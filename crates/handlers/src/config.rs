//! Tag sources declared outside the remote call path.

use std::collections::HashMap;

use fleetmetric_core::ResourceModel;
use tracing::warn;

/// Tags declared on the descriptor itself. `None` when it declares none.
///
/// A key declared with several values keeps the greatest value in tag order
/// and is reported, since the map can hold only one.
pub fn resource_defined_tags(model: &ResourceModel) -> Option<HashMap<String, String>> {
    let tags = model.tags.as_ref()?;
    let mut out = HashMap::with_capacity(tags.len());
    for t in tags {
        if let Some(prev) = out.insert(t.key.clone(), t.value.clone()) {
            warn!(metric = %model.name(), key = %t.key, dropped = %prev, kept = %t.value, "duplicate tag key on descriptor");
        }
    }
    Some(out)
}

/// Merge deployment-level (stack) tags with resource-level tags the way the
/// orchestrator builds `desired_resource_tags`: resource-level values win.
pub fn merge_tag_sources(
    resource: Option<HashMap<String, String>>,
    stack: Option<HashMap<String, String>>,
) -> Option<HashMap<String, String>> {
    match (resource, stack) {
        (None, None) => None,
        (resource, stack) => {
            let mut merged = stack.unwrap_or_default();
            merged.extend(resource.unwrap_or_default());
            Some(merged)
        }
    }
}
