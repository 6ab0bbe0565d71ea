//! Fleet metric core types: the resource descriptor, tags, and the outcome
//! vocabulary handed back to the orchestrator.

#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

mod outcome;
mod request;

pub use outcome::{OperationStatus, Outcome, OutcomeCode};
pub use request::{Action, HandlerRequest};

/// Resource type name as registered with the orchestrator.
pub const TYPE_NAME: &str = "AWS::IoT::FleetMetric";

/// Key prefix reserved for orchestrator bookkeeping tags.
pub const SYSTEM_TAG_PREFIX: &str = "aws:";

/// True when `key` lives in the reserved system namespace.
pub fn is_system_tag(key: &str) -> bool {
    key.starts_with(SYSTEM_TAG_PREFIX)
}

/// Resource-level tag as declared in the descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AggregationType {
    pub name: String,
    /// Aggregation functions, order preserved as declared.
    #[serde(default)]
    pub values: SmallVec<[String; 4]>,
}

/// The managed fleet metric.
///
/// `metric_arn`, `version`, `creation_date` and `last_modified_date` are
/// assigned by the remote service and are read-only from the caller's side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_arn: Option<String>,
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
    pub aggregation_type: Option<AggregationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<Tag>>,
}

impl ResourceModel {
    /// Minimal descriptor carrying only identity, as produced by listings.
    pub fn identity(name: impl Into<String>, arn: impl Into<String>) -> Self {
        Self { metric_name: Some(name.into()), metric_arn: Some(arn.into()), ..Default::default() }
    }

    pub fn name(&self) -> &str {
        self.metric_name.as_deref().unwrap_or("")
    }

    /// The caller supplied a non-empty identifier.
    pub fn has_arn(&self) -> bool {
        self.metric_arn.as_deref().is_some_and(|a| !a.is_empty())
    }
}

pub mod prelude {
    pub use super::{
        is_system_tag, Action, AggregationType, HandlerRequest, OperationStatus, Outcome, OutcomeCode,
        ResourceModel, Tag, SYSTEM_TAG_PREFIX, TYPE_NAME,
    };
}
