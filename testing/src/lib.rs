//! # Crudstore Testing
//!
//! In-memory backends and helpers for fast, deterministic crudstore tests:
//!
//! - [`InMemoryEventStore`]: per-id event streams with the backend's
//!   optimistic-concurrency behavior, plus a global application log
//! - [`InMemoryConsumerStore`]: `HashMap`-backed offset tracking
//! - [`FixedClock`] / [`test_clock`]: frozen time for reproducible
//!   `occurred_on` stamps
//!
//! ## Example
//!
//! ```ignore
//! use crudstore_engine::CrudStore;
//! use crudstore_testing::{InMemoryEventStore, test_clock};
//! use std::sync::Arc;
//!
//! #[tokio::test]
//! async fn create_then_get() {
//!     let store = Arc::new(InMemoryEventStore::new());
//!     let crud = CrudStore::new(store).with_clock(Arc::new(test_clock()));
//!
//!     let originator = crud
//!         .create("User", Originator::synthesize(), r#"{"name":"alice"}"#)
//!         .await
//!         .unwrap();
//!     assert_eq!(originator.version, "1");
//! }
//! ```

pub mod clock;
pub mod consumer_store;
pub mod event_store;

pub use clock::{FixedClock, test_clock};
pub use consumer_store::InMemoryConsumerStore;
pub use event_store::InMemoryEventStore;
