//! Events and application-log entries.
//!
//! An [`Event`] is one link in an entity's history: a `Created` event carries
//! the initial state, `Updated` events carry RFC 6902 deltas, and a `Deleted`
//! event tombstones the entity. Payloads are JSON text on the wire.
//!
//! Event types have the shape `<EntityType>.<Action>`; the action is the last
//! dot-separated segment, matched case-insensitively.

use crate::originator::Originator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three replayable CRUD actions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CrudAction {
    /// Initial full-state snapshot.
    Created,
    /// JSON-patch delta against the prior state.
    Updated,
    /// Tombstone; payload is ignored on replay.
    Deleted,
}

impl CrudAction {
    /// Parse the action from an event type string.
    ///
    /// The action is the last `.`-separated segment, case-insensitive.
    /// Returns `None` for anything that is not a CRUD event.
    ///
    /// # Examples
    ///
    /// ```
    /// use crudstore_core::event::CrudAction;
    ///
    /// assert_eq!(CrudAction::parse("User.Created"), Some(CrudAction::Created));
    /// assert_eq!(CrudAction::parse("User.UPDATED"), Some(CrudAction::Updated));
    /// assert_eq!(CrudAction::parse("User.Renamed"), None);
    /// ```
    #[must_use]
    pub fn parse(event_type: &str) -> Option<Self> {
        let name = event_type.rsplit('.').next().unwrap_or(event_type);
        match name.to_ascii_lowercase().as_str() {
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// The canonical action suffix (`Created`, `Updated`, `Deleted`).
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Updated => "Updated",
            Self::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for CrudAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Build the `<EntityType>.<Action>` event type string.
#[must_use]
pub fn crud_event_type(entity_type: &str, action: CrudAction) -> String {
    format!("{entity_type}.{}", action.suffix())
}

/// Extract the entity-type prefix (the first `.`-separated segment).
#[must_use]
pub fn entity_prefix(event_type: &str) -> &str {
    event_type.split('.').next().unwrap_or(event_type)
}

/// A single event in an entity's history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Identity of the revision this event produced.
    pub originator: Originator,
    /// `<EntityType>.<Action>` type string.
    pub event_type: String,
    /// JSON text; meaning depends on the action (snapshot, patch, or `"{}"`).
    pub payload: String,
    /// Unix epoch seconds at which the gateway recorded the event.
    pub occurred_on: i64,
}

impl Event {
    /// The CRUD action of this event, if it is one.
    #[must_use]
    pub fn action(&self) -> Option<CrudAction> {
        CrudAction::parse(&self.event_type)
    }

    /// Whether this event tombstones the entity.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.action() == Some(CrudAction::Deleted)
    }

    /// The entity-type prefix of this event's type string.
    #[must_use]
    pub fn entity_prefix(&self) -> &str {
        entity_prefix(&self.event_type)
    }
}

/// One entry of the global application log.
///
/// Entries are addressed by a monotonically increasing decimal `id`, which is
/// also the offset consumers persist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppLogEntry {
    /// Global log sequence id (decimal string).
    pub id: String,
    /// The logged event.
    pub event: Event,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive_on_last_segment() {
        assert_eq!(CrudAction::parse("User.Created"), Some(CrudAction::Created));
        assert_eq!(CrudAction::parse("User.updated"), Some(CrudAction::Updated));
        assert_eq!(CrudAction::parse("User.DELETED"), Some(CrudAction::Deleted));
        assert_eq!(
            CrudAction::parse("Nested.User.Created"),
            Some(CrudAction::Created)
        );
    }

    #[test]
    fn parse_rejects_unknown_actions() {
        assert_eq!(CrudAction::parse("User.Renamed"), None);
        assert_eq!(CrudAction::parse("Created.User"), None);
        assert_eq!(CrudAction::parse(""), None);
    }

    #[test]
    fn event_type_round_trip() {
        let event_type = crud_event_type("User", CrudAction::Updated);
        assert_eq!(event_type, "User.Updated");
        assert_eq!(CrudAction::parse(&event_type), Some(CrudAction::Updated));
        assert_eq!(entity_prefix(&event_type), "User");
    }

    #[test]
    fn entity_prefix_of_bare_type() {
        assert_eq!(entity_prefix("LogConsumer"), "LogConsumer");
    }

    #[test]
    fn event_helpers() {
        let event = Event {
            originator: Originator::new("id", "3"),
            event_type: "Order.Deleted".to_string(),
            payload: "{}".to_string(),
            occurred_on: 0,
        };
        assert!(event.is_deleted());
        assert_eq!(event.entity_prefix(), "Order");
        assert_eq!(event.action(), Some(CrudAction::Deleted));
    }
}
