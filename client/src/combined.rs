//! Bundled backend clients.

use crate::http::{HttpConsumerStore, HttpEventStore};
use crate::retry::{RetryPolicy, retry_with_backoff};
use crudstore_core::consumer_store::ConsumerStoreError;
use crudstore_core::event_store::EventStoreError;
use std::sync::Arc;
use thiserror::Error;

/// Errors from establishing the backend connections.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The event store never became reachable within the connect budget.
    #[error(transparent)]
    EventStore(#[from] EventStoreError),

    /// The consumer store never became reachable within the connect budget.
    #[error(transparent)]
    ConsumerStore(#[from] ConsumerStoreError),
}

/// The two backend handles used by the gateway and the consumer, bundled.
///
/// Handles are `Arc`ed so they can be shared across request workers and
/// consumers for the process lifetime.
#[derive(Clone)]
pub struct CombinedClient {
    /// Event-store handle.
    pub estore: Arc<HttpEventStore>,
    /// Consumer-offset-store handle.
    pub consumerstore: Arc<HttpConsumerStore>,
}

impl CombinedClient {
    /// Connect to both backends, retrying the initial liveness probes with
    /// exponential backoff (budget roughly ten seconds each).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when a backend stays unreachable past the
    /// retry budget.
    pub async fn connect(store_uri: &str, consumer_uri: &str) -> Result<Self, ClientError> {
        let estore = Arc::new(HttpEventStore::new(store_uri));
        let consumerstore = Arc::new(HttpConsumerStore::new(consumer_uri));

        let policy = RetryPolicy::connect();
        retry_with_backoff(&policy, || estore.healtz()).await?;
        retry_with_backoff(&policy, || consumerstore.healtz()).await?;

        tracing::info!(store_uri, consumer_uri, "connected to backend services");
        Ok(Self {
            estore,
            consumerstore,
        })
    }

    /// Build a client without probing the backends (tests, tooling).
    #[must_use]
    pub fn new_unchecked(store_uri: &str, consumer_uri: &str) -> Self {
        Self {
            estore: Arc::new(HttpEventStore::new(store_uri)),
            consumerstore: Arc::new(HttpConsumerStore::new(consumer_uri)),
        }
    }
}
