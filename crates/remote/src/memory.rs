//! In-process fleet metric service.
//!
//! Mirrors the management API's validation and failure behavior closely
//! enough to drive handlers end to end: name constraints, reserved tag keys,
//! per-resource tag limits, paged listings. Every call is recorded and
//! faults can be queued per operation.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    CreateFleetMetricRequest, CreateFleetMetricResponse, DescribeFleetMetricResponse, FleetMetricClient,
    FleetMetricNameAndArn, FleetMetricSpec, Page, RemoteError, RemoteTag, UpdateFleetMetricRequest,
};

static METRIC_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_\-.]{1,128}$").expect("valid regex"));

const RESERVED_TAG_PREFIX: &str = "aws:";
const MAX_TAGS_PER_RESOURCE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateFleetMetric,
    DescribeFleetMetric,
    UpdateFleetMetric,
    DeleteFleetMetric,
    ListFleetMetrics,
    ListTagsForResource,
    TagResource,
    UntagResource,
}

/// A recorded remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateFleetMetric { metric_name: String, tags: Vec<RemoteTag> },
    DescribeFleetMetric { metric_name: String },
    UpdateFleetMetric { metric_name: String },
    DeleteFleetMetric { metric_name: String },
    ListFleetMetrics { next_token: Option<String> },
    ListTagsForResource { resource_arn: String, next_token: Option<String> },
    TagResource { resource_arn: String, tags: Vec<RemoteTag> },
    UntagResource { resource_arn: String, tag_keys: Vec<String> },
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Call::CreateFleetMetric { .. } => Operation::CreateFleetMetric,
            Call::DescribeFleetMetric { .. } => Operation::DescribeFleetMetric,
            Call::UpdateFleetMetric { .. } => Operation::UpdateFleetMetric,
            Call::DeleteFleetMetric { .. } => Operation::DeleteFleetMetric,
            Call::ListFleetMetrics { .. } => Operation::ListFleetMetrics,
            Call::ListTagsForResource { .. } => Operation::ListTagsForResource,
            Call::TagResource { .. } => Operation::TagResource,
            Call::UntagResource { .. } => Operation::UntagResource,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMetric {
    pub metric_name: String,
    /// Assigned on seed when left empty.
    #[serde(default)]
    pub metric_arn: String,
    #[serde(flatten)]
    pub spec: FleetMetricSpec,
    #[serde(default = "first_version")]
    pub version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

fn first_version() -> i64 {
    1
}

fn indexing_default() -> bool {
    true
}

/// Serializable fleet state, used to seed and dump an [`InMemoryFleet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSnapshot {
    #[serde(default = "indexing_default")]
    pub indexing_enabled: bool,
    #[serde(default)]
    pub metrics: Vec<StoredMetric>,
}

impl Default for FleetSnapshot {
    fn default() -> Self {
        Self { indexing_enabled: true, metrics: Vec::new() }
    }
}

impl FleetSnapshot {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("parsing fleet fixture")
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("serializing fleet snapshot")
    }
}

#[derive(Debug, Default)]
struct State {
    indexing_enabled: bool,
    metrics: BTreeMap<String, StoredMetric>,
    calls: Vec<Call>,
    faults: HashMap<Operation, VecDeque<RemoteError>>,
}

pub struct InMemoryFleet {
    region: String,
    account_id: String,
    tag_page_size: usize,
    list_page_size: usize,
    state: Mutex<State>,
}

impl Default for InMemoryFleet {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFleet {
    pub fn new() -> Self {
        Self {
            region: "us-east-1".to_string(),
            account_id: "123456789012".to_string(),
            tag_page_size: 25,
            list_page_size: 50,
            state: Mutex::new(State { indexing_enabled: true, ..Default::default() }),
        }
    }

    pub fn with_page_sizes(mut self, tag_page_size: usize, list_page_size: usize) -> Self {
        self.tag_page_size = tag_page_size.max(1);
        self.list_page_size = list_page_size.max(1);
        self
    }

    pub fn with_indexing(self, enabled: bool) -> Self {
        self.state().indexing_enabled = enabled;
        self
    }

    pub fn from_snapshot(snapshot: FleetSnapshot) -> Self {
        let fleet = Self::new().with_indexing(snapshot.indexing_enabled);
        for m in snapshot.metrics {
            fleet.seed(m);
        }
        fleet
    }

    pub fn arn_for(&self, metric_name: &str) -> String {
        format!("arn:aws:iot:{}:{}:fleetmetric/{}", self.region, self.account_id, metric_name)
    }

    /// Insert a metric directly, bypassing validation and call recording.
    pub fn seed(&self, mut metric: StoredMetric) {
        if metric.metric_arn.is_empty() {
            metric.metric_arn = self.arn_for(&metric.metric_name);
        }
        let now = Utc::now();
        metric.creation_date.get_or_insert(now);
        metric.last_modified_date.get_or_insert(now);
        self.state().metrics.insert(metric.metric_name.clone(), metric);
    }

    /// Queue a failure for the next call of `op`.
    pub fn inject(&self, op: Operation, err: RemoteError) {
        self.state().faults.entry(op).or_default().push_back(err);
    }

    /// Set tags out of band, as a user editing the resource directly would.
    pub fn set_tags_out_of_band(&self, metric_name: &str, tags: &[(&str, &str)]) {
        if let Some(m) = self.state().metrics.get_mut(metric_name) {
            for (k, v) in tags {
                m.tags.insert((*k).to_string(), (*v).to_string());
            }
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn count(&self, op: Operation) -> usize {
        self.state().calls.iter().filter(|c| c.operation() == op).count()
    }

    pub fn metric(&self, metric_name: &str) -> Option<StoredMetric> {
        self.state().metrics.get(metric_name).cloned()
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        let st = self.state();
        FleetSnapshot { indexing_enabled: st.indexing_enabled, metrics: st.metrics.values().cloned().collect() }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and surface a queued fault, if any.
    fn begin(&self, call: Call) -> Result<MutexGuard<'_, State>, RemoteError> {
        let op = call.operation();
        debug!(?op, "in-memory fleet call");
        let mut st = self.state();
        st.calls.push(call);
        if let Some(err) = st.faults.get_mut(&op).and_then(VecDeque::pop_front) {
            return Err(err);
        }
        Ok(st)
    }
}

fn validate_name(metric_name: &str) -> Result<(), RemoteError> {
    if METRIC_NAME_RE.is_match(metric_name) {
        Ok(())
    } else {
        Err(RemoteError::invalid_request(format!(
            "1 validation error detected: Value '{}' at 'metricName' failed to satisfy constraint: \
             Member must satisfy regular expression pattern: [a-zA-Z0-9_\\-\\.]+",
            metric_name
        )))
    }
}

fn validate_spec(spec: &FleetMetricSpec) -> Result<(), RemoteError> {
    if let Some(p) = spec.period {
        if !(60..=86_400).contains(&p) || p % 60 != 0 {
            return Err(RemoteError::invalid_request(format!(
                "period {} must be a multiple of 60 between 60 and 86400",
                p
            )));
        }
    }
    Ok(())
}

fn validate_tags(tags: &[RemoteTag]) -> Result<(), RemoteError> {
    match tags.iter().find(|t| t.key.starts_with(RESERVED_TAG_PREFIX)) {
        Some(t) => Err(RemoteError::invalid_request(format!(
            "tag key '{}' uses the reserved prefix '{}'",
            t.key, RESERVED_TAG_PREFIX
        ))),
        None => Ok(()),
    }
}

fn parse_offset(token: Option<&str>) -> Result<usize, RemoteError> {
    match token {
        None | Some("") => Ok(0),
        Some(t) => t.parse::<usize>().map_err(|_| RemoteError::invalid_request(format!("invalid nextToken '{}'", t))),
    }
}

fn page_of<T>(all: Vec<T>, offset: usize, size: usize) -> Page<T> {
    let total = all.len();
    let items: Vec<T> = all.into_iter().skip(offset).take(size).collect();
    let end = offset + items.len();
    let next_token = if end < total { Some(end.to_string()) } else { None };
    Page { items, next_token }
}

fn missing(metric_name: &str) -> RemoteError {
    RemoteError::not_found(format!("Fleet metric {} does not exist", metric_name))
}

fn by_arn<'a>(st: &'a mut State, resource_arn: &str) -> Result<&'a mut StoredMetric, RemoteError> {
    st.metrics
        .values_mut()
        .find(|m| m.metric_arn == resource_arn)
        .ok_or_else(|| RemoteError::not_found(format!("resource {} does not exist", resource_arn)))
}

impl InMemoryFleet {
    fn do_create(&self, req: CreateFleetMetricRequest) -> Result<CreateFleetMetricResponse, RemoteError> {
        let mut st = self.begin(Call::CreateFleetMetric { metric_name: req.metric_name.clone(), tags: req.tags.clone() })?;
        validate_name(&req.metric_name)?;
        validate_spec(&req.spec)?;
        validate_tags(&req.tags)?;
        if req.tags.len() > MAX_TAGS_PER_RESOURCE {
            return Err(RemoteError::limit_exceeded(format!("at most {} tags per resource", MAX_TAGS_PER_RESOURCE)));
        }
        if st.metrics.contains_key(&req.metric_name) {
            return Err(RemoteError::already_exists(format!("Fleet metric {} already exists", req.metric_name)));
        }
        if !st.indexing_enabled {
            return Err(RemoteError::not_found("Fleet indexing is not enabled for this account"));
        }
        let now = Utc::now();
        let metric_arn = self.arn_for(&req.metric_name);
        let stored = StoredMetric {
            metric_name: req.metric_name.clone(),
            metric_arn: metric_arn.clone(),
            spec: req.spec,
            version: 1,
            creation_date: Some(now),
            last_modified_date: Some(now),
            tags: req.tags.into_iter().map(|t| (t.key, t.value)).collect(),
        };
        st.metrics.insert(req.metric_name.clone(), stored);
        Ok(CreateFleetMetricResponse { metric_name: req.metric_name, metric_arn })
    }

    fn do_describe(&self, metric_name: &str) -> Result<DescribeFleetMetricResponse, RemoteError> {
        let st = self.begin(Call::DescribeFleetMetric { metric_name: metric_name.to_string() })?;
        validate_name(metric_name)?;
        let m = st.metrics.get(metric_name).ok_or_else(|| missing(metric_name))?;
        Ok(DescribeFleetMetricResponse {
            metric_name: m.metric_name.clone(),
            metric_arn: m.metric_arn.clone(),
            spec: m.spec.clone(),
            version: m.version,
            creation_date: m.creation_date,
            last_modified_date: m.last_modified_date,
        })
    }

    fn do_update(&self, req: UpdateFleetMetricRequest) -> Result<(), RemoteError> {
        let mut st = self.begin(Call::UpdateFleetMetric { metric_name: req.metric_name.clone() })?;
        validate_name(&req.metric_name)?;
        validate_spec(&req.spec)?;
        let m = st.metrics.get_mut(&req.metric_name).ok_or_else(|| missing(&req.metric_name))?;
        m.spec = req.spec;
        m.version += 1;
        m.last_modified_date = Some(Utc::now());
        Ok(())
    }

    fn do_delete(&self, metric_name: &str) -> Result<(), RemoteError> {
        let mut st = self.begin(Call::DeleteFleetMetric { metric_name: metric_name.to_string() })?;
        validate_name(metric_name)?;
        st.metrics.remove(metric_name).map(|_| ()).ok_or_else(|| missing(metric_name))
    }

    fn do_list(&self, next_token: Option<&str>) -> Result<Page<FleetMetricNameAndArn>, RemoteError> {
        let st = self.begin(Call::ListFleetMetrics { next_token: next_token.map(str::to_string) })?;
        let offset = parse_offset(next_token)?;
        let all = st
            .metrics
            .values()
            .map(|m| FleetMetricNameAndArn { metric_name: m.metric_name.clone(), metric_arn: m.metric_arn.clone() })
            .collect();
        Ok(page_of(all, offset, self.list_page_size))
    }

    fn do_list_tags(&self, resource_arn: &str, next_token: Option<&str>) -> Result<Page<RemoteTag>, RemoteError> {
        let mut st = self.begin(Call::ListTagsForResource {
            resource_arn: resource_arn.to_string(),
            next_token: next_token.map(str::to_string),
        })?;
        let offset = parse_offset(next_token)?;
        let m = by_arn(&mut st, resource_arn)?;
        let all = m.tags.iter().map(|(k, v)| RemoteTag::new(k.clone(), v.clone())).collect();
        Ok(page_of(all, offset, self.tag_page_size))
    }

    fn do_tag(&self, resource_arn: &str, tags: Vec<RemoteTag>) -> Result<(), RemoteError> {
        let mut st = self.begin(Call::TagResource { resource_arn: resource_arn.to_string(), tags: tags.clone() })?;
        validate_tags(&tags)?;
        let m = by_arn(&mut st, resource_arn)?;
        let mut merged = m.tags.clone();
        merged.extend(tags.into_iter().map(|t| (t.key, t.value)));
        if merged.len() > MAX_TAGS_PER_RESOURCE {
            return Err(RemoteError::limit_exceeded(format!("at most {} tags per resource", MAX_TAGS_PER_RESOURCE)));
        }
        m.tags = merged;
        Ok(())
    }

    fn do_untag(&self, resource_arn: &str, tag_keys: Vec<String>) -> Result<(), RemoteError> {
        let mut st =
            self.begin(Call::UntagResource { resource_arn: resource_arn.to_string(), tag_keys: tag_keys.clone() })?;
        if let Some(k) = tag_keys.iter().find(|k| k.starts_with(RESERVED_TAG_PREFIX)) {
            return Err(RemoteError::invalid_request(format!("tag key '{}' uses the reserved prefix", k)));
        }
        let m = by_arn(&mut st, resource_arn)?;
        for k in &tag_keys {
            m.tags.remove(k);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl FleetMetricClient for InMemoryFleet {
    async fn create_fleet_metric(&self, req: CreateFleetMetricRequest) -> Result<CreateFleetMetricResponse, RemoteError> {
        self.do_create(req)
    }

    async fn describe_fleet_metric(&self, metric_name: &str) -> Result<DescribeFleetMetricResponse, RemoteError> {
        self.do_describe(metric_name)
    }

    async fn update_fleet_metric(&self, req: UpdateFleetMetricRequest) -> Result<(), RemoteError> {
        self.do_update(req)
    }

    async fn delete_fleet_metric(&self, metric_name: &str) -> Result<(), RemoteError> {
        self.do_delete(metric_name)
    }

    async fn list_fleet_metrics(&self, next_token: Option<&str>) -> Result<Page<FleetMetricNameAndArn>, RemoteError> {
        self.do_list(next_token)
    }

    async fn list_tags_for_resource(&self, resource_arn: &str, next_token: Option<&str>) -> Result<Page<RemoteTag>, RemoteError> {
        self.do_list_tags(resource_arn, next_token)
    }

    async fn tag_resource(&self, resource_arn: &str, tags: Vec<RemoteTag>) -> Result<(), RemoteError> {
        self.do_tag(resource_arn, tags)
    }

    async fn untag_resource(&self, resource_arn: &str, tag_keys: Vec<String>) -> Result<(), RemoteError> {
        self.do_untag(resource_arn, tag_keys)
    }
}
