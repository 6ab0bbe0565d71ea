use std::sync::Arc;

use fleetmetric_core::{HandlerRequest, Outcome, OutcomeCode};
use fleetmetric_remote::{FleetMetricClient, RemoteErrorKind};
use tracing::info;

use crate::classify::failed_outcome;
use crate::{Handler, HandlerError};

/// Deleting a resource that does not exist must fail with NotFound, so the
/// handler probes with describe first.
pub struct DeleteHandler {
    client: Arc<dyn FleetMetricClient>,
}

impl DeleteHandler {
    pub fn new(client: Arc<dyn FleetMetricClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Handler for DeleteHandler {
    async fn handle_request(&self, request: HandlerRequest) -> Result<Outcome, HandlerError> {
        let model = request.desired_resource_state;
        let name = model.name().to_string();

        match self.client.describe_fleet_metric(&name).await {
            Ok(_) => {}
            // A malformed name can never exist. NotFound lets the delete converge.
            Err(e) if e.kind == RemoteErrorKind::InvalidRequest => {
                info!(metric = %name, "returning NotFound for invalid name");
                return Ok(Outcome::failed(Some(model), OutcomeCode::NotFound, None));
            }
            Err(e) => return Ok(failed_outcome(Some(model), &e)),
        }

        if let Err(e) = self.client.delete_fleet_metric(&name).await {
            return Ok(failed_outcome(Some(model), &e));
        }
        info!(metric = %name, account = ?request.aws_account_id, "deleted fleet metric");
        Ok(Outcome::success(None))
    }
}
