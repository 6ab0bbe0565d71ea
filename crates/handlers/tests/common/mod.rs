#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use fleetmetric_core::{AggregationType, HandlerRequest, ResourceModel};
use fleetmetric_handlers::reconcile::TagDelta;
use fleetmetric_remote::{
    FleetMetricClient, FleetMetricSpec, InMemoryFleet, RemoteAggregationType, RemoteTag, StoredMetric,
};

pub const METRIC_NAME: &str = "TestFleetMetricName";
pub const METRIC_ARN: &str = "arn:aws:iot:us-east-1:123456789012:fleetmetric/TestFleetMetricName";
pub const INDEX_NAME: &str = "AWS_Things";
pub const QUERY_STRING: &str = "thingName:*";
pub const STACK_TAG_KEY: &str = "aws:cloudformation:stack-name";

pub fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub fn system_tags() -> HashMap<String, String> {
    map(&[(STACK_TAG_KEY, "UnitTestStack")])
}

pub fn model() -> ResourceModel {
    ResourceModel {
        metric_name: Some(METRIC_NAME.to_string()),
        query_string: Some(QUERY_STRING.to_string()),
        index_name: Some(INDEX_NAME.to_string()),
        aggregation_field: Some("testField".to_string()),
        aggregation_type: Some(AggregationType {
            name: "Statistics".to_string(),
            values: ["count", "sum", "average"].iter().map(|s| s.to_string()).collect(),
        }),
        period: Some(60),
        ..Default::default()
    }
}

pub fn stored(name: &str, tags: &[(&str, &str)]) -> StoredMetric {
    StoredMetric {
        metric_name: name.to_string(),
        metric_arn: String::new(),
        spec: FleetMetricSpec {
            query_string: Some(QUERY_STRING.to_string()),
            index_name: Some(INDEX_NAME.to_string()),
            period: Some(60),
            aggregation_type: Some(RemoteAggregationType {
                name: "Statistics".to_string(),
                values: vec!["count".to_string()],
            }),
            ..Default::default()
        },
        version: 1,
        creation_date: None,
        last_modified_date: None,
        tags: tags.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<BTreeMap<_, _>>(),
    }
}

pub fn request(model: ResourceModel) -> HandlerRequest {
    HandlerRequest::new(model)
}

pub fn fleet() -> Arc<InMemoryFleet> {
    Arc::new(InMemoryFleet::new())
}

pub fn client(fleet: &Arc<InMemoryFleet>) -> Arc<dyn FleetMetricClient> {
    fleet.clone()
}

/// The tag set the remote holds once `delta` is applied to `live`: detached
/// keys go, attached tags replace any live tag with the same key.
pub fn apply_delta(live: &HashSet<RemoteTag>, delta: &TagDelta) -> HashSet<RemoteTag> {
    let replaced: HashSet<&str> = delta.attach.iter().map(|t| t.key.as_str()).collect();
    live.iter()
        .filter(|t| !delta.detach_keys.contains(&t.key) && !replaced.contains(t.key.as_str()))
        .cloned()
        .chain(delta.attach.iter().cloned())
        .collect()
}
