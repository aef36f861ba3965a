//! Error types crossing the client core boundary.

use crate::ids::TransactionId;
use std::time::Duration;
use thiserror::Error;

/// Failure talking to the backend. Every failed save maps to one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// The backend rejected a stale write.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("save timed out after {0:?}")]
    TimedOut(Duration),
    #[error("save cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("transaction {0} is not in the loaded statement")]
    TransactionNotFound(TransactionId),
    #[error("invalid edit for field {field:?}: {reason}")]
    InvalidField { field: String, reason: String },
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl ReconcileError {
    pub(crate) fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ReconcileError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error(transparent)]
    Remote(#[from] RemoteError),
}
