use std::sync::Arc;

use fleetmetric_core::{HandlerRequest, Outcome, ResourceModel};
use fleetmetric_remote::FleetMetricClient;
use tracing::info;

use crate::classify::failed_outcome;
use crate::{Handler, HandlerError};

pub struct ListHandler {
    client: Arc<dyn FleetMetricClient>,
}

impl ListHandler {
    pub fn new(client: Arc<dyn FleetMetricClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Handler for ListHandler {
    async fn handle_request(&self, request: HandlerRequest) -> Result<Outcome, HandlerError> {
        let page = match self.client.list_fleet_metrics(request.next_token.as_deref()).await {
            Ok(p) => p,
            Err(e) => return Ok(failed_outcome(Some(request.desired_resource_state), &e)),
        };
        let next_token = page.continuation().map(str::to_string);
        let models: Vec<ResourceModel> =
            page.items.into_iter().map(|m| ResourceModel::identity(m.metric_name, m.metric_arn)).collect();
        info!(count = models.len(), more = next_token.is_some(), account = ?request.aws_account_id, "listed fleet metrics");
        Ok(Outcome::listed(models, next_token))
    }
}
