//! # Crudstore Consumer
//!
//! Durable application-log consumption: stream every event in the log from a
//! resolved starting offset, hand each entry to a handler in stream order,
//! and persist progress per consumer name so a restart resumes where the
//! last run left off (at-least-once delivery).

pub mod consumer;

pub use consumer::{ApplicationLogConsumer, ConsumerError, EntryHandler, StartOffset};
