use serde::{Deserialize, Serialize};

use crate::ResourceModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Success,
    Failed,
}

/// Closed set of failure codes understood by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeCode {
    AlreadyExists,
    InvalidRequest,
    ServiceLimitExceeded,
    AccessDenied,
    InternalFailure,
    Throttling,
    NotFound,
    GeneralServiceException,
}

impl OutcomeCode {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeCode::AlreadyExists => "AlreadyExists",
            OutcomeCode::InvalidRequest => "InvalidRequest",
            OutcomeCode::ServiceLimitExceeded => "ServiceLimitExceeded",
            OutcomeCode::AccessDenied => "AccessDenied",
            OutcomeCode::InternalFailure => "InternalFailure",
            OutcomeCode::Throttling => "Throttling",
            OutcomeCode::NotFound => "NotFound",
            OutcomeCode::GeneralServiceException => "GeneralServiceException",
        }
    }

    /// Codes the orchestrator re-invokes on; everything else is terminal.
    pub fn is_retryable(self) -> bool {
        matches!(self, OutcomeCode::Throttling | OutcomeCode::InternalFailure)
    }
}

impl std::fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one handler invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_model: Option<ResourceModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_models: Option<Vec<ResourceModel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<OutcomeCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl Outcome {
    /// Success carrying the resulting descriptor; `None` for deletes.
    pub fn success(model: Option<ResourceModel>) -> Self {
        Self {
            status: OperationStatus::Success,
            resource_model: model,
            resource_models: None,
            error_code: None,
            message: None,
            next_token: None,
        }
    }

    /// Success for a list page.
    pub fn listed(models: Vec<ResourceModel>, next_token: Option<String>) -> Self {
        Self {
            status: OperationStatus::Success,
            resource_model: None,
            resource_models: Some(models),
            error_code: None,
            message: None,
            next_token,
        }
    }

    pub fn failed(model: Option<ResourceModel>, code: OutcomeCode, message: Option<String>) -> Self {
        Self {
            status: OperationStatus::Failed,
            resource_model: model,
            resource_models: None,
            error_code: Some(code),
            message,
            next_token: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }
}
