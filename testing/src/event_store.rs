//! In-memory event store for fast, deterministic testing.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Test utilities document panics where critical

use crudstore_core::event::{AppLogEntry, Event, entity_prefix};
use crudstore_core::event_store::{EventStore, EventStoreError, LogStream, StoreFuture};
use crudstore_core::originator::Originator;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct Inner {
    /// Per-id event streams, ordered by version ascending.
    streams: HashMap<String, Vec<Event>>,
    /// Global application log; entry ids are `index + 1` as decimal strings.
    log: Vec<AppLogEntry>,
}

/// In-memory [`EventStore`] with the same optimistic-concurrency behavior as
/// the real backend: an append whose version is not exactly `current + 1`
/// for its id is rejected as a concurrency conflict.
///
/// `logs_poll` yields a snapshot of matching entries and then ends, rather
/// than tailing forever; consume loops terminate at end-of-stream, which is
/// what deterministic tests want.
///
/// # Example
///
/// ```
/// use crudstore_testing::InMemoryEventStore;
/// use crudstore_core::event_store::EventStore;
/// use crudstore_core::{Event, Originator};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryEventStore::new();
/// store.append(Event {
///     originator: Originator::new("id", "1"),
///     event_type: "User.Created".to_string(),
///     payload: r#"{"name":"alice"}"#.to_string(),
///     occurred_on: 0,
/// }).await?;
/// assert_eq!(store.log_len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryEventStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the global application log.
    #[must_use]
    pub fn log_len(&self) -> usize {
        self.inner.read().unwrap().log.len()
    }

    /// Snapshot of the events stored for `id` (for assertions).
    #[must_use]
    pub fn events_for(&self, id: &str) -> Vec<Event> {
        self.inner
            .read()
            .unwrap()
            .streams
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    /// Clear all streams and the application log (for test isolation).
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.streams.clear();
        inner.log.clear();
    }

    fn selector_matches(selector: &str, event: &Event) -> bool {
        selector == "*" || entity_prefix(&event.event_type) == selector
    }
}

impl EventStore for InMemoryEventStore {
    fn append(&self, event: Event) -> StoreFuture<'_, Result<(), EventStoreError>> {
        Box::pin(async move {
            let version: u64 = event.originator.version.parse().map_err(|_| {
                EventStoreError::InvalidResponse(format!(
                    "non-numeric version {:?}",
                    event.originator.version
                ))
            })?;

            let mut inner = self.inner.write().unwrap();
            let stream = inner.streams.entry(event.originator.id.clone()).or_default();
            if version != stream.len() as u64 + 1 {
                return Err(EventStoreError::Concurrency {
                    id: event.originator.id.clone(),
                    version: event.originator.version.clone(),
                });
            }

            stream.push(event.clone());
            let id = (inner.log.len() + 1).to_string();
            inner.log.push(AppLogEntry { id, event });
            Ok(())
        })
    }

    fn get_events(
        &self,
        originator: Originator,
    ) -> StoreFuture<'_, Result<Vec<Event>, EventStoreError>> {
        Box::pin(async move {
            Ok(self
                .inner
                .read()
                .unwrap()
                .streams
                .get(&originator.id)
                .cloned()
                .unwrap_or_default())
        })
    }

    fn logs_poll(
        &self,
        from_id: String,
        selector: String,
    ) -> StoreFuture<'_, Result<LogStream, EventStoreError>> {
        Box::pin(async move {
            let from: u64 = from_id.parse().map_err(|_| {
                EventStoreError::InvalidResponse(format!("non-numeric from_id {from_id:?}"))
            })?;

            let entries: Vec<AppLogEntry> = self
                .inner
                .read()
                .unwrap()
                .log
                .iter()
                .filter(|entry| entry.id.parse::<u64>().unwrap() >= from)
                .filter(|entry| Self::selector_matches(&selector, &entry.event))
                .cloned()
                .collect();

            Ok(futures::stream::iter(entries.into_iter().map(Ok)).boxed())
        })
    }
}
