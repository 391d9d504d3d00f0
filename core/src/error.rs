//! Domain error taxonomy.
//!
//! The projection engine and gateway raise [`CrudError`]; only the web layer
//! maps it onto transport statuses. Backend failures are lowered into this
//! taxonomy at the engine boundary: concurrency conflicts pass through as
//! [`CrudError::Concurrency`], everything else unclassified becomes
//! [`CrudError::Internal`].

use crate::event_store::EventStoreError;
use crate::patch::PatchError;
use thiserror::Error;

/// Transport-neutral error kinds of the CRUD gateway.
#[derive(Error, Debug)]
pub enum CrudError {
    /// Unknown entity, or a tombstoned entity read without `deleted=true`.
    #[error("{0}")]
    NotFound(String),

    /// Missing or ill-formed fields, bad UUID, empty update diff, or an
    /// unrecognized event action during replay.
    #[error("{0}")]
    InvalidArgument(String),

    /// The event store rejected an append due to a version collision.
    #[error("{0}")]
    Concurrency(String),

    /// Anything unclassified. Details are logged; clients see only the
    /// generic message.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<EventStoreError> for CrudError {
    fn from(err: EventStoreError) -> Self {
        match err {
            EventStoreError::Concurrency { .. } => Self::Concurrency(err.to_string()),
            other => Self::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<PatchError> for CrudError {
    fn from(err: PatchError) -> Self {
        match err {
            // A payload that fails to parse as a patch document is a bad
            // input; a patch that fails to apply means corrupt history.
            PatchError::Malformed(msg) => Self::InvalidArgument(msg),
            PatchError::Apply(_) => Self::Internal(anyhow::Error::new(err)),
        }
    }
}
