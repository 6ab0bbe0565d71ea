//! Descriptor <-> remote record translation.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use fleetmetric_core::{AggregationType, ResourceModel, Tag};
use fleetmetric_remote::{DescribeFleetMetricResponse, FleetMetricSpec, RemoteAggregationType};

/// Mutable fields of `model` as sent on create and update.
pub fn spec_from_model(model: &ResourceModel) -> FleetMetricSpec {
    FleetMetricSpec {
        description: model.description.clone(),
        query_string: model.query_string.clone(),
        period: model.period,
        aggregation_field: model.aggregation_field.clone(),
        query_version: model.query_version.clone(),
        index_name: model.index_name.clone(),
        unit: model.unit.clone(),
        aggregation_type: model.aggregation_type.as_ref().map(|a| RemoteAggregationType {
            name: a.name.clone(),
            values: a.values.iter().cloned().collect(),
        }),
    }
}

/// Canonical instant rendering: RFC 3339, UTC `Z`, fractional seconds only when present.
pub fn render_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Full descriptor from a describe response plus the resource's tags.
pub fn model_from_describe(resp: DescribeFleetMetricResponse, tags: BTreeSet<Tag>) -> ResourceModel {
    let spec = resp.spec;
    ResourceModel {
        metric_name: Some(resp.metric_name),
        metric_arn: Some(resp.metric_arn),
        description: spec.description,
        query_string: spec.query_string,
        period: spec.period,
        aggregation_field: spec.aggregation_field,
        query_version: spec.query_version,
        index_name: spec.index_name,
        unit: spec.unit,
        aggregation_type: spec
            .aggregation_type
            .map(|a| AggregationType { name: a.name, values: a.values.into_iter().collect() }),
        version: Some(resp.version as f64),
        creation_date: resp.creation_date.map(render_timestamp),
        last_modified_date: resp.last_modified_date.map(render_timestamp),
        tags: Some(tags),
    }
}
