//! The event-sourced CRUD projection engine.
//!
//! [`CrudStore`] turns CRUD calls into event appends and reconstructs current
//! entity state by replaying the event stream:
//!
//! - `create` appends a `Created` event carrying the initial snapshot
//! - `update` replays the stream, diffs the incoming state against it, and
//!   appends an `Updated` event carrying the RFC 6902 delta
//! - `get` replays the stream (snapshot, then patches in order)
//! - `delete` appends a `Deleted` tombstone
//!
//! The engine holds no locks and caches nothing; every read re-replays the
//! stream. Correctness under concurrent mutation of the same originator
//! relies entirely on the event store rejecting a duplicate-version append.

use crudstore_core::clock::{Clock, SystemClock};
use crudstore_core::error::CrudError;
use crudstore_core::event::{CrudAction, Event, crud_event_type};
use crudstore_core::event_store::EventStore;
use crudstore_core::originator::Originator;
use crudstore_core::patch;
use serde_json::Value;
use std::sync::Arc;

/// CRUD semantics over an append-only event stream.
///
/// The store handle is long-lived and shared; `CrudStore` itself is cheap to
/// clone and safe to share across request workers.
///
/// # Example
///
/// ```ignore
/// let crud = CrudStore::new(event_store);
/// let originator = crud
///     .create("User", Originator::synthesize(), r#"{"name":"alice"}"#)
///     .await?;
/// let (state, latest) = crud.get("User", &originator, false).await?;
/// ```
#[derive(Clone)]
pub struct CrudStore {
    store: Arc<dyn EventStore>,
    clock: Arc<dyn Clock>,
}

impl CrudStore {
    /// Create an engine over the given event store, stamping events with the
    /// system clock.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock (tests pin time with a fixed clock).
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Create a new entity: append `<entity_type>.Created` carrying the
    /// initial snapshot.
    ///
    /// An originator without a version is defaulted to `"1"`. A top-level
    /// `"originator"` field in the payload is silently stripped - the event
    /// stream is the sole source of identity.
    ///
    /// # Errors
    ///
    /// - [`CrudError::InvalidArgument`] for an empty entity type or a payload
    ///   that is not a JSON object
    /// - [`CrudError::Concurrency`] when the `(id, version)` pair already
    ///   exists in the store
    pub async fn create(
        &self,
        entity_type: &str,
        originator: Originator,
        payload: &str,
    ) -> Result<Originator, CrudError> {
        if entity_type.is_empty() {
            return Err(CrudError::InvalidArgument(
                "missing entity_type param".to_string(),
            ));
        }

        let mut originator = originator;
        if !originator.has_version() {
            originator.version = "1".to_string();
        }

        let snapshot = parse_object_payload(payload)?;
        let event = self.crud_event(
            originator.clone(),
            entity_type,
            CrudAction::Created,
            serialize_payload(&snapshot)?,
        );

        tracing::debug!(originator = %originator, entity_type, "appending create event");
        self.store.append(event).await?;
        Ok(originator)
    }

    /// Update an entity: replay the current state, diff the incoming payload
    /// against it, and append `<entity_type>.Updated` carrying the patch.
    ///
    /// The caller-supplied version is only an identity handle for reading;
    /// the new version is the stream's latest plus one. Updating a deleted
    /// entity fails with [`CrudError::NotFound`].
    ///
    /// # Errors
    ///
    /// - [`CrudError::InvalidArgument`] for a missing version or a payload
    ///   whose stripped form equals the current state (`nothing to update`)
    /// - [`CrudError::NotFound`] for an unknown or tombstoned entity
    /// - [`CrudError::Concurrency`] when a concurrent mutation won the append
    pub async fn update(
        &self,
        entity_type: &str,
        originator: &Originator,
        payload: &str,
    ) -> Result<Originator, CrudError> {
        if !originator.has_version() {
            return Err(CrudError::InvalidArgument("missing version".to_string()));
        }

        let (current, latest) = self.get(entity_type, originator, false).await?;

        let mut incoming: Value = serde_json::from_str(payload)
            .map_err(|e| CrudError::InvalidArgument(format!("payload is not valid JSON: {e}")))?;
        strip_embedded_originator(&mut incoming);

        let delta = patch::diff(&current, &incoming);
        if delta.0.is_empty() {
            return Err(CrudError::InvalidArgument("nothing to update".to_string()));
        }

        let next = latest.next()?;
        let event = self.crud_event(
            next.clone(),
            entity_type,
            CrudAction::Updated,
            patch::to_text(&delta)?,
        );

        tracing::debug!(
            originator = %next,
            entity_type,
            operations = delta.0.len(),
            "appending update event"
        );
        self.store.append(event).await?;
        Ok(next)
    }

    /// Reconstruct current state by replaying the entity's event stream.
    ///
    /// Returns the state together with the latest originator seen in the
    /// stream. With `include_deleted` false, a stream ending in a tombstone
    /// reads as absent; with it true, the pre-deletion state is returned and
    /// the originator carries the tombstone's version.
    ///
    /// The entity type is accepted but not enforced against the stream (the
    /// store is keyed by id only); it is retained for API symmetry.
    ///
    /// # Errors
    ///
    /// - [`CrudError::NotFound`] when the stream is empty, or tombstoned and
    ///   `include_deleted` is false
    /// - [`CrudError::InvalidArgument`] when a replayed event is not one of
    ///   the three CRUD actions, or a payload fails to parse
    pub async fn get(
        &self,
        entity_type: &str,
        originator: &Originator,
        include_deleted: bool,
    ) -> Result<(Value, Originator), CrudError> {
        let events = self.store.get_events(originator.clone()).await?;
        let Some(first) = events.first() else {
            return Err(CrudError::NotFound("not found".to_string()));
        };

        if !include_deleted && events.last().is_some_and(Event::is_deleted) {
            return Err(CrudError::NotFound(format!("object deleted : {originator}")));
        }

        let mut state: Value = serde_json::from_str(&first.payload).map_err(|e| {
            CrudError::InvalidArgument(format!("initial payload is not valid JSON: {e}"))
        })?;
        let mut latest = first.originator.clone();

        for event in &events[1..] {
            let Some(action) = event.action() else {
                return Err(CrudError::InvalidArgument(format!(
                    "don't know how to play event : {}",
                    event.event_type
                )));
            };

            latest = event.originator.clone();
            if action == CrudAction::Deleted {
                continue;
            }

            let delta = patch::parse(&event.payload)?;
            state = patch::apply(state, &delta)?;
        }

        tracing::trace!(
            originator = %latest,
            entity_type,
            events = events.len(),
            "replayed entity state"
        );
        Ok((state, latest))
    }

    /// Delete an entity: resolve the latest revision and append
    /// `<entity_type>.Deleted` one version past it.
    ///
    /// The tombstone is terminal; no further events are appended for this id
    /// by the gateway.
    ///
    /// # Errors
    ///
    /// - [`CrudError::NotFound`] for an unknown or already-deleted entity
    /// - [`CrudError::Concurrency`] when a concurrent mutation won the append
    pub async fn delete(
        &self,
        entity_type: &str,
        originator: &Originator,
    ) -> Result<Originator, CrudError> {
        let (_, latest) = self.get(entity_type, originator, false).await?;

        let next = latest.next()?;
        let event = self.crud_event(
            next.clone(),
            entity_type,
            CrudAction::Deleted,
            "{}".to_string(),
        );

        tracing::debug!(originator = %next, entity_type, "appending delete event");
        self.store.append(event).await?;
        Ok(next)
    }

    fn crud_event(
        &self,
        originator: Originator,
        entity_type: &str,
        action: CrudAction,
        payload: String,
    ) -> Event {
        Event {
            originator,
            event_type: crud_event_type(entity_type, action),
            payload,
            occurred_on: self.clock.now().timestamp(),
        }
    }
}

/// Parse a create payload, requiring a JSON object and stripping a top-level
/// `"originator"` field.
fn parse_object_payload(payload: &str) -> Result<Value, CrudError> {
    let mut value: Value = serde_json::from_str(payload)
        .map_err(|e| CrudError::InvalidArgument(format!("payload is not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(CrudError::InvalidArgument(
            "payload must be a JSON object".to_string(),
        ));
    }
    strip_embedded_originator(&mut value);
    Ok(value)
}

/// Remove a top-level `"originator"` field, if the value is an object.
fn strip_embedded_originator(value: &mut Value) {
    if let Some(map) = value.as_object_mut() {
        map.remove("originator");
    }
}

fn serialize_payload(value: &Value) -> Result<String, CrudError> {
    serde_json::to_string(value).map_err(|e| CrudError::Internal(anyhow::Error::new(e)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crudstore_testing::{InMemoryEventStore, test_clock};
    use serde_json::json;

    fn engine() -> (CrudStore, Arc<InMemoryEventStore>) {
        let store = Arc::new(InMemoryEventStore::new());
        let crud = CrudStore::new(store.clone()).with_clock(Arc::new(test_clock()));
        (crud, store)
    }

    async fn create_user(crud: &CrudStore, payload: &str) -> Originator {
        crud.create("User", Originator::synthesize(), payload)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let (crud, _) = engine();

        let originator = create_user(&crud, r#"{"name":"alice"}"#).await;
        assert_eq!(originator.version, "1");

        let (state, latest) = crud.get("User", &originator, false).await.unwrap();
        assert_eq!(state, json!({"name": "alice"}));
        assert_eq!(latest, originator);
    }

    #[tokio::test]
    async fn create_defaults_missing_version_to_one() {
        let (crud, _) = engine();
        let mut originator = Originator::synthesize();
        originator.version = String::new();

        let created = crud.create("User", originator, "{}").await.unwrap();
        assert_eq!(created.version, "1");
    }

    #[tokio::test]
    async fn create_strips_embedded_originator() {
        let (crud, store) = engine();

        let originator =
            create_user(&crud, r#"{"name":"alice","originator":{"id":"x","version":"9"}}"#).await;

        let events = store.events_for(&originator.id);
        assert_eq!(events[0].payload, r#"{"name":"alice"}"#);

        let (state, _) = crud.get("User", &originator, false).await.unwrap();
        assert_eq!(state, json!({"name": "alice"}));
    }

    #[tokio::test]
    async fn create_rejects_non_object_payload() {
        let (crud, _) = engine();
        let err = crud
            .create("User", Originator::synthesize(), "[1,2,3]")
            .await
            .unwrap_err();
        assert!(matches!(err, CrudError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn create_rejects_empty_entity_type() {
        let (crud, _) = engine();
        let err = crud
            .create("", Originator::synthesize(), "{}")
            .await
            .unwrap_err();
        assert!(matches!(err, CrudError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn update_appends_patch_and_bumps_version() {
        let (crud, store) = engine();

        let originator = create_user(&crud, r#"{"name":"alice"}"#).await;
        let updated = crud
            .update("User", &originator, r#"{"name":"bob"}"#)
            .await
            .unwrap();
        assert_eq!(updated.id, originator.id);
        assert_eq!(updated.version, "2");

        let (state, latest) = crud.get("User", &originator, false).await.unwrap();
        assert_eq!(state, json!({"name": "bob"}));
        assert_eq!(latest.version, "2");

        // The stored payload is a patch, not a snapshot.
        let events = store.events_for(&originator.id);
        assert_eq!(events[1].event_type, "User.Updated");
        let delta = patch::parse(&events[1].payload).unwrap();
        assert!(!delta.0.is_empty());
    }

    #[tokio::test]
    async fn repeated_updates_converge_on_last_payload() {
        let (crud, _) = engine();

        let originator = create_user(&crud, r#"{"name":"alice","age":30}"#).await;
        let steps = [
            json!({"name": "bob", "age": 30}),
            json!({"name": "bob", "age": 31, "city": "berlin"}),
            json!({"city": "hamburg"}),
        ];

        let mut handle = originator.clone();
        for step in &steps {
            handle = crud
                .update("User", &handle, &step.to_string())
                .await
                .unwrap();
        }
        assert_eq!(handle.version, "4");

        let (state, _) = crud.get("User", &originator, false).await.unwrap();
        assert_eq!(state, steps[2]);
    }

    #[tokio::test]
    async fn noop_update_is_rejected() {
        let (crud, _) = engine();

        let originator = create_user(&crud, r#"{"name":"bob"}"#).await;
        let err = crud
            .update("User", &originator, r#"{"name":"bob"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, CrudError::InvalidArgument(ref msg) if msg == "nothing to update"));
    }

    #[tokio::test]
    async fn update_whose_only_change_is_embedded_originator_is_a_noop() {
        let (crud, _) = engine();

        let originator = create_user(&crud, r#"{"name":"bob"}"#).await;
        let err = crud
            .update(
                "User",
                &originator,
                r#"{"name":"bob","originator":{"id":"x","version":"1"}}"#,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CrudError::InvalidArgument(ref msg) if msg == "nothing to update"));
    }

    #[tokio::test]
    async fn update_without_version_is_rejected() {
        let (crud, _) = engine();

        let originator = create_user(&crud, r#"{"name":"alice"}"#).await;
        let err = crud
            .update("User", &Originator::latest(&originator.id), r#"{"a":1}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, CrudError::InvalidArgument(ref msg) if msg == "missing version"));
    }

    #[tokio::test]
    async fn update_uses_latest_stream_version_not_callers() {
        let (crud, _) = engine();

        let originator = create_user(&crud, r#"{"n":1}"#).await;
        crud.update("User", &originator, r#"{"n":2}"#).await.unwrap();

        // Caller still holds version "1"; the stream is at "2".
        let updated = crud
            .update("User", &originator, r#"{"n":3}"#)
            .await
            .unwrap();
        assert_eq!(updated.version, "3");
    }

    #[tokio::test]
    async fn get_unknown_entity_is_not_found() {
        let (crud, _) = engine();
        let err = crud
            .get("User", &Originator::latest("missing"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, CrudError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_tombstones_and_bumps_version() {
        let (crud, _) = engine();

        let originator = create_user(&crud, r#"{"name":"alice"}"#).await;
        crud.update("User", &originator, r#"{"name":"bob"}"#)
            .await
            .unwrap();

        let deleted = crud.delete("User", &originator).await.unwrap();
        assert_eq!(deleted.version, "3");

        let err = crud.get("User", &originator, false).await.unwrap_err();
        assert!(matches!(err, CrudError::NotFound(_)));

        // History is retained: reading with deleted=true yields the
        // pre-deletion state under the tombstone's version.
        let (state, latest) = crud.get("User", &originator, true).await.unwrap();
        assert_eq!(state, json!({"name": "bob"}));
        assert_eq!(latest.version, "3");
    }

    #[tokio::test]
    async fn update_on_deleted_entity_is_not_found() {
        let (crud, _) = engine();

        let originator = create_user(&crud, r#"{"name":"alice"}"#).await;
        crud.delete("User", &originator).await.unwrap();

        let err = crud
            .update("User", &originator, r#"{"name":"bob"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, CrudError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_on_deleted_entity_is_not_found() {
        let (crud, _) = engine();

        let originator = create_user(&crud, r#"{"name":"alice"}"#).await;
        crud.delete("User", &originator).await.unwrap();

        let err = crud.delete("User", &originator).await.unwrap_err();
        assert!(matches!(err, CrudError::NotFound(_)));
    }

    #[tokio::test]
    async fn version_sequence_has_no_gaps() {
        let (crud, store) = engine();

        let originator = create_user(&crud, r#"{"n":0}"#).await;
        for n in 1..=3 {
            crud.update("User", &originator, &json!({ "n": n }).to_string())
                .await
                .unwrap();
        }
        crud.delete("User", &originator).await.unwrap();

        let versions: Vec<String> = store
            .events_for(&originator.id)
            .into_iter()
            .map(|e| e.originator.version)
            .collect();
        assert_eq!(versions, vec!["1", "2", "3", "4", "5"]);
    }

    #[tokio::test]
    async fn duplicate_create_surfaces_concurrency() {
        let (crud, _) = engine();

        let originator = create_user(&crud, r#"{"n":0}"#).await;
        let err = crud
            .create("User", originator, r#"{"n":1}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, CrudError::Concurrency(_)));
    }

    #[tokio::test]
    async fn replay_rejects_non_crud_events() {
        let (crud, store) = engine();
        let originator = create_user(&crud, r#"{"n":0}"#).await;

        store
            .append(Event {
                originator: Originator::new(&originator.id, "2"),
                event_type: "User.Renamed".to_string(),
                payload: "{}".to_string(),
                occurred_on: 0,
            })
            .await
            .unwrap();

        let err = crud.get("User", &originator, false).await.unwrap_err();
        assert!(
            matches!(err, CrudError::InvalidArgument(ref msg) if msg.contains("User.Renamed"))
        );
    }

    #[tokio::test]
    async fn events_are_stamped_with_the_clock() {
        let (crud, store) = engine();
        let originator = create_user(&crud, r#"{"n":0}"#).await;

        let events = store.events_for(&originator.id);
        assert_eq!(events[0].occurred_on, test_clock().now().timestamp());
    }
}
