use std::sync::Arc;

use fleetmetric_core::{HandlerRequest, Outcome};
use fleetmetric_remote::{FleetMetricClient, UpdateFleetMetricRequest};
use tracing::{info, warn};

use crate::classify::failed_outcome;
use crate::reconcile::sync_tags;
use crate::tags::effective_desired_tags;
use crate::translate::spec_from_model;
use crate::{Handler, HandlerError};

/// Update, then describe for the identifier, then reconcile tags.
///
/// No rollback: a failure after the update call leaves the new field values
/// in place; re-invoking converges.
pub struct UpdateHandler {
    client: Arc<dyn FleetMetricClient>,
}

impl UpdateHandler {
    pub fn new(client: Arc<dyn FleetMetricClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Handler for UpdateHandler {
    async fn handle_request(&self, request: HandlerRequest) -> Result<Outcome, HandlerError> {
        let mut model = request.desired_resource_state;
        let name = model.name().to_string();
        if model.has_arn() {
            warn!(arn = ?model.metric_arn, "MetricArn cannot be updated and will be ignored");
        }

        let req = UpdateFleetMetricRequest { metric_name: name.clone(), spec: spec_from_model(&model) };
        if let Err(e) = self.client.update_fleet_metric(req).await {
            return Ok(failed_outcome(Some(model), &e));
        }
        info!(metric = %name, "updated fleet metric");

        let described = match self.client.describe_fleet_metric(&name).await {
            Ok(d) => d,
            Err(e) => return Ok(failed_outcome(Some(model), &e)),
        };

        if request.system_tags.is_none() {
            warn!(arn = %described.metric_arn, "system tags are absent from the update request");
        }
        let desired = effective_desired_tags(request.desired_resource_tags.as_ref());
        if let Err(e) = sync_tags(self.client.as_ref(), &described.metric_arn, &desired).await {
            return Ok(failed_outcome(Some(model), &e));
        }

        model.metric_arn = Some(described.metric_arn);
        Ok(Outcome::success(Some(model)))
    }
}
