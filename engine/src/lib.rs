//! # Crudstore Engine
//!
//! The event-sourced CRUD projection engine: create/update/get/delete
//! semantics reconstructed from an append-only event stream.
//!
//! Mutations are translated into appended events (`Created` snapshots,
//! `Updated` JSON-patch deltas, `Deleted` tombstones); reads replay the
//! stream from the start. There is no in-memory cache of reconstructed
//! state, so every read is O(event-history), and concurrent writers to the
//! same originator are arbitrated solely by the event store's optimistic
//! concurrency on `(id, version)`.

pub mod crud;

pub use crud::CrudStore;
