//! Consumer-offset store abstraction.
//!
//! Tracks, per consumer name, the id of the last successfully processed
//! application-log entry. Absence of a saved offset is a normal state for a
//! consumer that has never run with `save_progress` enabled.

use crate::event_store::StoreFuture;
use thiserror::Error;

/// Errors surfaced by a consumer-offset store backend.
#[derive(Error, Debug)]
pub enum ConsumerStoreError {
    /// No offset has been saved for this consumer yet.
    #[error("no saved offset for consumer {0}")]
    OffsetNotFound(String),

    /// Connection or protocol failure talking to the backend.
    #[error("consumer store transport error: {0}")]
    Transport(String),

    /// The backend answered with something this client cannot decode.
    #[error("invalid response from consumer store: {0}")]
    InvalidResponse(String),
}

/// Durable per-consumer offset storage.
///
/// Offsets are string-encoded decimal integers; they advance monotonically
/// as entries are processed.
pub trait ConsumerStore: Send + Sync {
    /// The last saved offset for `consumer_id`.
    ///
    /// Fails with [`ConsumerStoreError::OffsetNotFound`] when nothing has
    /// been saved yet.
    fn get_offset(&self, consumer_id: String)
    -> StoreFuture<'_, Result<String, ConsumerStoreError>>;

    /// Persist `offset` as the last processed entry for `consumer_id`.
    fn save_offset(
        &self,
        consumer_id: String,
        offset: String,
    ) -> StoreFuture<'_, Result<(), ConsumerStoreError>>;
}
