//! Remote failure -> outcome code.

use fleetmetric_core::{Outcome, OutcomeCode, ResourceModel};
use fleetmetric_remote::{RemoteError, RemoteErrorKind};
use metrics::counter;
use tracing::{error, warn};

/// Label a remote failure with the orchestrator's outcome vocabulary.
///
/// First match wins: the failure kind is checked before the transport
/// status, so a 403 only decides the code for kinds without a mapping of
/// their own.
pub fn classify(err: &RemoteError) -> OutcomeCode {
    warn!(kind = ?err.kind, status = ?err.status, message = %err.message, trace = ?err, "translating remote failure");
    let code = match err.kind {
        RemoteErrorKind::ResourceAlreadyExists => OutcomeCode::AlreadyExists,
        RemoteErrorKind::InvalidRequest => OutcomeCode::InvalidRequest,
        RemoteErrorKind::LimitExceeded => OutcomeCode::ServiceLimitExceeded,
        RemoteErrorKind::Unauthorized => OutcomeCode::AccessDenied,
        RemoteErrorKind::InternalFailure => OutcomeCode::InternalFailure,
        RemoteErrorKind::Throttling => OutcomeCode::Throttling,
        RemoteErrorKind::ResourceNotFound => OutcomeCode::NotFound,
        _ if err.status == Some(403) => OutcomeCode::AccessDenied,
        RemoteErrorKind::IndexNotReady => OutcomeCode::GeneralServiceException,
        _ => {
            error!(kind = ?err.kind, message = %err.message, "unexpected remote failure");
            counter!("fleetmetric_unexpected_errors_total", 1);
            OutcomeCode::InternalFailure
        }
    };
    counter!("fleetmetric_classified_errors_total", 1, "code" => code.as_str());
    code
}

/// Failed outcome for `err`. InternalFailure never carries the remote message.
pub fn failed_outcome(model: Option<ResourceModel>, err: &RemoteError) -> Outcome {
    let code = classify(err);
    let message = (code != OutcomeCode::InternalFailure).then(|| err.message.clone());
    Outcome::failed(model, code, message)
}
