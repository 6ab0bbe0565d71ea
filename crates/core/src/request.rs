use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ResourceModel;

/// Lifecycle operation requested by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::List => "list",
        }
    }
}

/// Orchestrator request envelope for a single invocation.
///
/// `desired_resource_tags` is the merged map of resource-level and
/// deployment-level tags. Previous-state fields are carried for completeness
/// but tag reconciliation never consults them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerRequest {
    #[serde(default)]
    pub desired_resource_state: ResourceModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_resource_state: Option<ResourceModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_resource_tags: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_resource_tags: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_tags: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_request_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_account_id: Option<String>,
}

impl HandlerRequest {
    pub fn new(desired: ResourceModel) -> Self {
        Self { desired_resource_state: desired, ..Default::default() }
    }

    pub fn with_desired_tags(mut self, tags: HashMap<String, String>) -> Self {
        self.desired_resource_tags = Some(tags);
        self
    }

    pub fn with_system_tags(mut self, tags: HashMap<String, String>) -> Self {
        self.system_tags = Some(tags);
        self
    }

    pub fn with_next_token(mut self, token: Option<String>) -> Self {
        self.next_token = token;
        self
    }
}
