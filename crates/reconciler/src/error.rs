//! Error types for the reconciler crate.
//!
//! A missing object is never an error here: store lookups return `Ok(None)`.
//! Everything in this enum is surfaced to the controller runtime, which owns
//! retry and backoff.

use thiserror::Error;

use crate::types::{ObjectKey, ResourceKind};

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciler error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Reading an object from the store failed.
    #[error("failed to get {kind} '{key}': {reason}")]
    GetFailed {
        kind: ResourceKind,
        key: ObjectKey,
        reason: String,
    },
    /// Creating an object failed for a reason other than a name clash.
    #[error("failed to create {kind} '{key}': {reason}")]
    CreateFailed {
        kind: ResourceKind,
        key: ObjectKey,
        reason: String,
    },
    /// Updating an object failed for a reason other than a write conflict.
    #[error("failed to update {kind} '{key}': {reason}")]
    UpdateFailed {
        kind: ResourceKind,
        key: ObjectKey,
        reason: String,
    },
    /// An object with the same name already exists.
    #[error("{kind} '{key}' already exists")]
    AlreadyExists { kind: ResourceKind, key: ObjectKey },
    /// The object changed (or vanished) since it was read.
    #[error("{kind} '{key}' was modified concurrently")]
    Conflict { kind: ResourceKind, key: ObjectKey },
    /// The owner carries no UID, so no owner reference can point at it.
    #[error("wildfly '{key}' has no uid")]
    MissingOwnerUid { key: ObjectKey },
}

impl Error {
    /// Create a get failed error.
    pub fn get_failed(kind: ResourceKind, key: &ObjectKey, reason: impl Into<String>) -> Self {
        Self::GetFailed {
            kind,
            key: key.clone(),
            reason: reason.into(),
        }
    }

    /// Create a create failed error.
    pub fn create_failed(kind: ResourceKind, key: &ObjectKey, reason: impl Into<String>) -> Self {
        Self::CreateFailed {
            kind,
            key: key.clone(),
            reason: reason.into(),
        }
    }

    /// Create an update failed error.
    pub fn update_failed(kind: ResourceKind, key: &ObjectKey, reason: impl Into<String>) -> Self {
        Self::UpdateFailed {
            kind,
            key: key.clone(),
            reason: reason.into(),
        }
    }

    /// Create an already exists error.
    pub fn already_exists(kind: ResourceKind, key: &ObjectKey) -> Self {
        Self::AlreadyExists {
            kind,
            key: key.clone(),
        }
    }

    /// Create a conflict error.
    pub fn conflict(kind: ResourceKind, key: &ObjectKey) -> Self {
        Self::Conflict {
            kind,
            key: key.clone(),
        }
    }

    /// Whether re-running the pass may succeed.
    ///
    /// Store failures are transient from the reconciler's point of view. A
    /// missing owner UID only clears once the owner object is recreated.
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::MissingOwnerUid { .. })
    }
}
