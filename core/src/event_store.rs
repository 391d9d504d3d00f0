//! Event store abstraction.
//!
//! The event store is an external append-only log indexed by originator id,
//! ordered by version per id, with a global sequence id for log-wide
//! subscription. This module defines the consumed interface; implementations
//! live elsewhere (`crudstore-client` over HTTP, `crudstore-testing` in
//! memory).
//!
//! # Dyn Compatibility
//!
//! The trait uses explicit `Pin<Box<dyn Future>>` returns instead of
//! `async fn` to enable trait object usage (`Arc<dyn EventStore>`), which is
//! how the engine, consumer, and gateway share one long-lived handle.

use crate::event::{AppLogEntry, Event};
use crate::originator::Originator;
use futures::Stream;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future alias used by the store traits.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Long-lived server stream of application-log entries.
pub type LogStream = Pin<Box<dyn Stream<Item = Result<AppLogEntry, EventStoreError>> + Send>>;

/// Errors surfaced by an event store backend.
#[derive(Error, Debug)]
pub enum EventStoreError {
    /// Optimistic-concurrency rejection: the `(id, version)` pair already
    /// exists in the stream.
    #[error("concurrency conflict appending {id} at version {version}")]
    Concurrency {
        /// Originator id of the rejected append.
        id: String,
        /// Version the append collided on.
        version: String,
    },

    /// Connection or protocol failure talking to the backend.
    #[error("event store transport error: {0}")]
    Transport(String),

    /// The backend answered with something this client cannot decode.
    #[error("invalid response from event store: {0}")]
    InvalidResponse(String),
}

/// Append-only event log, queryable per originator and streamable globally.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a single handle is shared across
/// all request workers for the process lifetime.
pub trait EventStore: Send + Sync {
    /// Append one event.
    ///
    /// The store enforces optimistic concurrency on the `(id, version)` pair
    /// and rejects duplicates with [`EventStoreError::Concurrency`].
    fn append(&self, event: Event) -> StoreFuture<'_, Result<(), EventStoreError>>;

    /// All events for `originator.id`, ordered by version ascending.
    ///
    /// An empty result is a valid response meaning "unknown entity".
    fn get_events(&self, originator: Originator)
    -> StoreFuture<'_, Result<Vec<Event>, EventStoreError>>;

    /// Open a long-lived subscription over the application log.
    ///
    /// Yields entries with id `>= from_id` that match `selector` (an opaque
    /// filter string interpreted by the store; `"*"` means everything).
    fn logs_poll(
        &self,
        from_id: String,
        selector: String,
    ) -> StoreFuture<'_, Result<LogStream, EventStoreError>>;
}
