//! Fleet metric lifecycle handlers.
//!
//! One handler per orchestrator operation. Each takes its remote client as
//! a constructor argument, runs its remote calls strictly in sequence and
//! reports a single [`Outcome`]. The only fault that escapes as an error is
//! a create conflict ([`HandlerError::AlreadyExists`]).

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Instant;

use fleetmetric_core::{Action, HandlerRequest, Outcome, OutcomeCode, ResourceModel};
use fleetmetric_remote::{FleetMetricClient, RemoteError};
use metrics::{counter, histogram};
use tracing::{info_span, Instrument};

pub mod classify;
pub mod config;
pub mod paginate;
pub mod reconcile;
pub mod tags;
pub mod translate;

mod create;
mod delete;
mod list;
mod read;
mod update;

pub use create::CreateHandler;
pub use delete::DeleteHandler;
pub use list::ListHandler;
pub use read::ReadHandler;
pub use update::UpdateHandler;

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Create hit an existing resource. Raised rather than reported, since
    /// the orchestrator treats create conflicts differently from failures.
    #[error("fleet metric {name} already exists")]
    AlreadyExists {
        name: String,
        #[source]
        source: RemoteError,
    },
}

impl HandlerError {
    /// Render the fault as a failed outcome for callers that need one.
    pub fn into_outcome(self, model: Option<ResourceModel>) -> Outcome {
        match self {
            HandlerError::AlreadyExists { source, .. } => {
                Outcome::failed(model, OutcomeCode::AlreadyExists, Some(source.message))
            }
        }
    }
}

#[async_trait::async_trait]
pub trait Handler: Send + Sync {
    async fn handle_request(&self, request: HandlerRequest) -> Result<Outcome, HandlerError>;
}

pub fn handler_for(action: Action, client: Arc<dyn FleetMetricClient>) -> Box<dyn Handler> {
    match action {
        Action::Create => Box::new(CreateHandler::new(client)),
        Action::Read => Box::new(ReadHandler::new(client)),
        Action::Update => Box::new(UpdateHandler::new(client)),
        Action::Delete => Box::new(DeleteHandler::new(client)),
        Action::List => Box::new(ListHandler::new(client)),
    }
}

/// Run one invocation of `action` with span, timing and outcome metrics.
pub async fn invoke(
    action: Action,
    client: Arc<dyn FleetMetricClient>,
    request: HandlerRequest,
) -> Result<Outcome, HandlerError> {
    let span = info_span!(
        "handler",
        action = action.as_str(),
        metric = %request.desired_resource_state.name(),
        request_token = ?request.client_request_token,
    );
    async move {
        let t0 = Instant::now();
        let res = handler_for(action, client).handle_request(request).await;
        let status = match &res {
            Ok(o) if o.is_success() => "success",
            Ok(_) => "failed",
            Err(_) => "fault",
        };
        histogram!("fleetmetric_invocation_latency_ms", t0.elapsed().as_secs_f64() * 1000.0, "action" => action.as_str());
        counter!("fleetmetric_invocations_total", 1, "action" => action.as_str(), "status" => status);
        tracing::info!(status, "invocation finished");
        res
    }
    .instrument(span)
    .await
}
