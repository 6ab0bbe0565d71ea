use serde::{Deserialize, Serialize};

/// Failure identity reported by the management API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteErrorKind {
    ResourceAlreadyExists,
    InvalidRequest,
    LimitExceeded,
    Unauthorized,
    InternalFailure,
    Throttling,
    ResourceNotFound,
    IndexNotReady,
    VersionConflict,
    ServiceUnavailable,
    /// Failed before a response was received (connection, signing, timeout).
    Client,
    Unknown,
}

impl RemoteErrorKind {
    /// Transport status the service pairs with this kind, if any.
    pub fn default_status(self) -> Option<u16> {
        match self {
            RemoteErrorKind::ResourceAlreadyExists | RemoteErrorKind::VersionConflict => Some(409),
            RemoteErrorKind::InvalidRequest | RemoteErrorKind::IndexNotReady => Some(400),
            RemoteErrorKind::LimitExceeded => Some(410),
            RemoteErrorKind::Unauthorized => Some(401),
            RemoteErrorKind::InternalFailure => Some(500),
            RemoteErrorKind::Throttling => Some(429),
            RemoteErrorKind::ResourceNotFound => Some(404),
            RemoteErrorKind::ServiceUnavailable => Some(503),
            RemoteErrorKind::Client | RemoteErrorKind::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    /// Transport status of the failed response, when one was received.
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self { kind, status: kind.default_status(), message: message.into() }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::ResourceAlreadyExists, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::InvalidRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::ResourceNotFound, message)
    }

    pub fn limit_exceeded(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::LimitExceeded, message)
    }

    pub fn throttling(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Throttling, message)
    }
}
