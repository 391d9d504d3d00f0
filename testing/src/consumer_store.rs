//! In-memory consumer-offset store.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity

use crudstore_core::consumer_store::{ConsumerStore, ConsumerStoreError};
use crudstore_core::event_store::StoreFuture;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory [`ConsumerStore`] tracking offsets in a `HashMap`.
///
/// # Example
///
/// ```
/// use crudstore_testing::InMemoryConsumerStore;
/// use crudstore_core::consumer_store::ConsumerStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryConsumerStore::new();
/// store.save_offset("reader".to_string(), "3".to_string()).await?;
/// assert_eq!(store.get_offset("reader".to_string()).await?, "3");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryConsumerStore {
    offsets: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryConsumerStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The saved offset for `consumer_id`, if any (for assertions).
    #[must_use]
    pub fn saved_offset(&self, consumer_id: &str) -> Option<String> {
        self.offsets.read().unwrap().get(consumer_id).cloned()
    }

    /// Clear all saved offsets (for test isolation).
    pub fn clear(&self) {
        self.offsets.write().unwrap().clear();
    }
}

impl ConsumerStore for InMemoryConsumerStore {
    fn get_offset(
        &self,
        consumer_id: String,
    ) -> StoreFuture<'_, Result<String, ConsumerStoreError>> {
        Box::pin(async move {
            self.offsets
                .read()
                .unwrap()
                .get(&consumer_id)
                .cloned()
                .ok_or(ConsumerStoreError::OffsetNotFound(consumer_id))
        })
    }

    fn save_offset(
        &self,
        consumer_id: String,
        offset: String,
    ) -> StoreFuture<'_, Result<(), ConsumerStoreError>> {
        Box::pin(async move {
            self.offsets.write().unwrap().insert(consumer_id, offset);
            Ok(())
        })
    }
}
