//! Fleet metric management API boundary.
//!
//! Handlers only ever talk to [`FleetMetricClient`]. Every failure crosses the
//! boundary as a [`RemoteError`] carrying a closed [`RemoteErrorKind`].

#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod error;
mod memory;

pub use error::{RemoteError, RemoteErrorKind};
pub use memory::{Call, FleetSnapshot, InMemoryFleet, Operation, StoredMetric};

/// Tag record as the management API represents it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTag {
    pub key: String,
    pub value: String,
}

impl RemoteTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAggregationType {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Mutable fleet metric fields shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetMetricSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_type: Option<RemoteAggregationType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateFleetMetricRequest {
    pub metric_name: String,
    pub spec: FleetMetricSpec,
    pub tags: Vec<RemoteTag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFleetMetricResponse {
    pub metric_name: String,
    pub metric_arn: String,
}

/// Update never carries tags; tags go through tag/untag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateFleetMetricRequest {
    pub metric_name: String,
    pub spec: FleetMetricSpec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeFleetMetricResponse {
    pub metric_name: String,
    pub metric_arn: String,
    pub spec: FleetMetricSpec,
    pub version: i64,
    pub creation_date: Option<DateTime<Utc>>,
    pub last_modified_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetMetricNameAndArn {
    pub metric_name: String,
    pub metric_arn: String,
}

/// One page of a paged listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next_token: None }
    }

    /// Continuation token, treating an empty string as end of listing.
    pub fn continuation(&self) -> Option<&str> {
        self.next_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// The remote fleet metric management API.
///
/// Each method is a single request/response. Implementations must not retry;
/// retry policy belongs to whoever interprets the classified outcome.
#[async_trait::async_trait]
pub trait FleetMetricClient: Send + Sync {
    async fn create_fleet_metric(&self, req: CreateFleetMetricRequest) -> Result<CreateFleetMetricResponse, RemoteError>;

    async fn describe_fleet_metric(&self, metric_name: &str) -> Result<DescribeFleetMetricResponse, RemoteError>;

    async fn update_fleet_metric(&self, req: UpdateFleetMetricRequest) -> Result<(), RemoteError>;

    async fn delete_fleet_metric(&self, metric_name: &str) -> Result<(), RemoteError>;

    async fn list_fleet_metrics(&self, next_token: Option<&str>) -> Result<Page<FleetMetricNameAndArn>, RemoteError>;

    async fn list_tags_for_resource(&self, resource_arn: &str, next_token: Option<&str>) -> Result<Page<RemoteTag>, RemoteError>;

    async fn tag_resource(&self, resource_arn: &str, tags: Vec<RemoteTag>) -> Result<(), RemoteError>;

    async fn untag_resource(&self, resource_arn: &str, tag_keys: Vec<String>) -> Result<(), RemoteError>;
}
