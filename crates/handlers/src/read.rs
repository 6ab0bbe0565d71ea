use std::sync::Arc;

use fleetmetric_core::{HandlerRequest, Outcome};
use fleetmetric_remote::FleetMetricClient;
use tracing::info;

use crate::classify::failed_outcome;
use crate::paginate::list_all_tags;
use crate::tags::to_local;
use crate::translate::model_from_describe;
use crate::{Handler, HandlerError};

pub struct ReadHandler {
    client: Arc<dyn FleetMetricClient>,
}

impl ReadHandler {
    pub fn new(client: Arc<dyn FleetMetricClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Handler for ReadHandler {
    async fn handle_request(&self, request: HandlerRequest) -> Result<Outcome, HandlerError> {
        let model = request.desired_resource_state;
        let name = model.name().to_string();

        let described = match self.client.describe_fleet_metric(&name).await {
            Ok(d) => d,
            Err(e) => return Ok(failed_outcome(Some(model), &e)),
        };

        // describe does not return tags
        let remote_tags = match list_all_tags(self.client.as_ref(), &described.metric_arn).await {
            Ok(t) => t,
            Err(e) => return Ok(failed_outcome(Some(model), &e)),
        };

        info!(arn = %described.metric_arn, tags = remote_tags.len(), "described fleet metric");
        let tags = to_local(Some(remote_tags.as_slice()));
        Ok(Outcome::success(Some(model_from_describe(described, tags))))
    }
}
