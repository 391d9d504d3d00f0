//! # Crudstore Client
//!
//! HTTP clients for the two external backends the gateway depends on - the
//! event store (`append` / `get events` / log polling) and the
//! consumer-offset store - plus [`CombinedClient`], which bundles the two
//! handles behind one connect call with exponential-backoff retry.

pub mod combined;
pub mod http;
pub mod retry;

pub use combined::{ClientError, CombinedClient};
pub use http::{HttpConsumerStore, HttpEventStore};
pub use retry::{RetryPolicy, retry_with_backoff};
