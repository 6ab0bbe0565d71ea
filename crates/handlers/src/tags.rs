//! Conversions between descriptor tags, tag maps and remote tag records.
//!
//! Context free: nothing here filters by namespace except
//! [`excluding_system_tags`], which callers apply explicitly.

use std::collections::{BTreeSet, HashMap, HashSet};

use fleetmetric_core::{is_system_tag, Tag};
use fleetmetric_remote::RemoteTag;

/// One remote record per map entry. Absent input is an empty set.
pub fn to_remote(tags: Option<&HashMap<String, String>>) -> HashSet<RemoteTag> {
    tags.map(|m| m.iter().map(|(k, v)| RemoteTag::new(k.clone(), v.clone())).collect()).unwrap_or_default()
}

/// Remote records back to descriptor tags. Absent input is an empty set.
pub fn to_local(tags: Option<&[RemoteTag]>) -> BTreeSet<Tag> {
    tags.map(|ts| ts.iter().map(|t| Tag::new(t.key.clone(), t.value.clone())).collect()).unwrap_or_default()
}

/// Drop every tag in the reserved system namespace.
pub fn excluding_system_tags(tags: Option<&HashMap<String, String>>) -> HashMap<String, String> {
    tags.map(|m| m.iter().filter(|(k, _)| !is_system_tag(k)).map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

/// The tag set to send to the remote API for a merged request tag map.
pub fn effective_desired_tags(request_tags: Option<&HashMap<String, String>>) -> HashSet<RemoteTag> {
    to_remote(Some(&excluding_system_tags(request_tags)))
}

/// Stable order for request payloads.
pub fn sorted(tags: impl IntoIterator<Item = RemoteTag>) -> Vec<RemoteTag> {
    let mut v: Vec<RemoteTag> = tags.into_iter().collect();
    v.sort();
    v
}
