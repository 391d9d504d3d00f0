//! # Crudstore Core
//!
//! Core types and backend traits for the crudstore gateway - a service that
//! exposes create/read/update/delete semantics on top of an append-only event
//! log. Entity state is never stored directly; it is reconstructed by
//! replaying a `Created` snapshot followed by `Updated` JSON-patch deltas,
//! possibly terminated by a `Deleted` tombstone.
//!
//! This crate provides:
//!
//! - [`originator::Originator`]: the `(id, version)` identity of an entity
//!   revision, with syntactic validation
//! - [`event::Event`] and [`event::AppLogEntry`]: the log's data model
//! - [`patch`]: RFC 6902 diff/apply used as the update wire form
//! - [`error::CrudError`]: the transport-neutral error taxonomy
//! - [`event_store::EventStore`] and [`consumer_store::ConsumerStore`]: the
//!   consumed interfaces of the two external backends
//! - [`clock::Clock`]: injected time for deterministic tests
//!
//! The projection engine itself lives in `crudstore-engine`; the log consumer
//! in `crudstore-consumer`; HTTP bindings in `crudstore-client` and
//! `crudstore-web`.

pub mod clock;
pub mod consumer_store;
pub mod error;
pub mod event;
pub mod event_store;
pub mod originator;
pub mod patch;

pub use clock::{Clock, SystemClock};
pub use consumer_store::{ConsumerStore, ConsumerStoreError};
pub use error::CrudError;
pub use event::{AppLogEntry, CrudAction, Event, crud_event_type, entity_prefix};
pub use event_store::{EventStore, EventStoreError, LogStream, StoreFuture};
pub use originator::Originator;
