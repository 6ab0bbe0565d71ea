use std::sync::Arc;

use fleetmetric_core::{HandlerRequest, Outcome, OutcomeCode};
use fleetmetric_remote::{CreateFleetMetricRequest, FleetMetricClient, RemoteErrorKind};
use tracing::{info, warn};

use crate::classify::failed_outcome;
use crate::tags::{effective_desired_tags, sorted};
use crate::translate::spec_from_model;
use crate::{Handler, HandlerError};

pub struct CreateHandler {
    client: Arc<dyn FleetMetricClient>,
}

impl CreateHandler {
    pub fn new(client: Arc<dyn FleetMetricClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Handler for CreateHandler {
    async fn handle_request(&self, request: HandlerRequest) -> Result<Outcome, HandlerError> {
        let mut model = request.desired_resource_state;
        if model.has_arn() {
            warn!(arn = ?model.metric_arn, "MetricArn is read-only but the caller supplied one");
            return Ok(Outcome::failed(
                Some(model),
                OutcomeCode::InvalidRequest,
                Some("MetricArn is a read-only property and cannot be set.".to_string()),
            ));
        }

        let req = CreateFleetMetricRequest {
            metric_name: model.name().to_string(),
            spec: spec_from_model(&model),
            tags: sorted(effective_desired_tags(request.desired_resource_tags.as_ref())),
        };

        match self.client.create_fleet_metric(req).await {
            Ok(resp) => {
                info!(metric = %resp.metric_name, arn = %resp.metric_arn, "created fleet metric");
                model.metric_arn = Some(resp.metric_arn);
                Ok(Outcome::success(Some(model)))
            }
            Err(e) if e.kind == RemoteErrorKind::ResourceAlreadyExists => {
                info!(metric = %model.name(), "fleet metric already exists");
                Err(HandlerError::AlreadyExists { name: model.name().to_string(), source: e })
            }
            Err(e) if e.kind == RemoteErrorKind::ResourceNotFound => {
                warn!(metric = %model.name(), message = %e.message, trace = ?e, "fleet indexing is not enabled");
                Ok(Outcome::failed(Some(model), OutcomeCode::NotFound, Some(e.message)))
            }
            Err(e) => Ok(failed_outcome(Some(model), &e)),
        }
    }
}
