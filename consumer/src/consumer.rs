//! Application-log consumer with durable offset tracking.
//!
//! [`ApplicationLogConsumer`] streams entries from the global application log
//! starting at a resolved offset, filters out the consumer machinery's own
//! entries, hands each entry to a handler in strict stream order, and - when
//! progress saving is enabled - persists the entry id after the handler
//! returns.
//!
//! Offset persistence for entry N happens *after* the handler returns, so a
//! crash between the two may redeliver N on restart: delivery is
//! at-least-once.

use crudstore_core::consumer_store::{ConsumerStore, ConsumerStoreError};
use crudstore_core::event::AppLogEntry;
use crudstore_core::event_store::{EventStore, EventStoreError};
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Where a consumer starts reading the application log.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StartOffset {
    /// Start at log id `"1"`.
    #[default]
    FromBeginning,
    /// Resume after the last saved offset; a consumer with no saved offset
    /// starts at the beginning.
    FromSaved,
}

/// Errors from the consume loop.
#[derive(Error, Debug)]
pub enum ConsumerError {
    /// The log stream or its subscription failed.
    #[error(transparent)]
    Store(#[from] EventStoreError),

    /// Offset load/save failed (other than a missing saved offset, which is
    /// a normal first run).
    #[error(transparent)]
    Offsets(#[from] ConsumerStoreError),

    /// The saved offset did not parse as a decimal integer.
    #[error("invalid saved offset: {0:?}")]
    InvalidOffset(String),

    /// The entry handler failed; the loop stops before saving the entry's
    /// offset, so the entry is redelivered on restart.
    #[error("handler error: {0}")]
    Handler(#[source] anyhow::Error),
}

/// Processes one application-log entry.
///
/// Implemented for any `Fn(AppLogEntry) -> impl Future<Output = Result<(),
/// anyhow::Error>>` closure, so tests and simple consumers can pass a
/// closure directly.
pub trait EntryHandler: Send + Sync {
    /// Handle one entry. Returning an error stops the consume loop before
    /// the entry's offset is saved.
    fn handle(&self, entry: AppLogEntry) -> impl Future<Output = Result<(), anyhow::Error>> + Send;
}

impl<F, Fut> EntryHandler for F
where
    F: Fn(AppLogEntry) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), anyhow::Error>> + Send,
{
    fn handle(&self, entry: AppLogEntry) -> impl Future<Output = Result<(), anyhow::Error>> + Send {
        self(entry)
    }
}

/// Streams the application log to a handler, durably advancing a per-name
/// offset.
///
/// # Cancellation
///
/// The caller supplies a [`watch`] flag that is polled once per entry; a
/// handler that blocks indefinitely cannot be interrupted by it. Termination
/// of the underlying stream also ends the loop.
///
/// # Example
///
/// ```ignore
/// let consumer = ApplicationLogConsumer::new(es, offsets, "billing", handler)
///     .with_start_offset(StartOffset::FromSaved);
///
/// let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
/// let handle = consumer.spawn(cancel_rx);
/// // ... later:
/// cancel_tx.send(true).ok();
/// handle.await??;
/// ```
pub struct ApplicationLogConsumer<H> {
    es_client: Arc<dyn EventStore>,
    consumer_client: Arc<dyn ConsumerStore>,
    consumer_name: String,
    handler: H,
    start: StartOffset,
    selector: String,
    save_progress: bool,
}

impl<H> ApplicationLogConsumer<H>
where
    H: EntryHandler,
{
    /// Entity-type prefixes never delivered to the handler. These entries
    /// record the consumer machinery's own progress; replaying them into a
    /// consumer would feed back on itself.
    pub const EXCLUDES: &'static [&'static str] = &["LogConsumer"];

    /// Create a consumer with the default settings: start from the
    /// beginning, selector `"*"`, progress saving enabled.
    #[must_use]
    pub fn new(
        es_client: Arc<dyn EventStore>,
        consumer_client: Arc<dyn ConsumerStore>,
        consumer_name: impl Into<String>,
        handler: H,
    ) -> Self {
        Self {
            es_client,
            consumer_client,
            consumer_name: consumer_name.into(),
            handler,
            start: StartOffset::FromBeginning,
            selector: "*".to_string(),
            save_progress: true,
        }
    }

    /// Set where the consumer starts reading.
    #[must_use]
    pub const fn with_start_offset(mut self, start: StartOffset) -> Self {
        self.start = start;
        self
    }

    /// Set the entity-type selector forwarded to the event store
    /// (`"*"` means everything).
    #[must_use]
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    /// Enable or disable offset persistence after each handled entry.
    #[must_use]
    pub const fn with_save_progress(mut self, save_progress: bool) -> Self {
        self.save_progress = save_progress;
        self
    }

    /// Run the consume loop until the stream ends, cancellation is
    /// observed, or an error occurs.
    ///
    /// Entries are handed to the handler in strict stream order; the offset
    /// for entry N is saved only after the handler returns for N.
    ///
    /// # Errors
    ///
    /// Propagates stream, offset-store, and handler failures. Cancellation
    /// is not an error.
    pub async fn consume(&self, cancel: watch::Receiver<bool>) -> Result<(), ConsumerError> {
        let from_id = self.find_start_offset().await?;
        tracing::info!(
            consumer = %self.consumer_name,
            from_id = %from_id,
            selector = %self.selector,
            "starting application-log consume"
        );

        let mut stream = self
            .es_client
            .logs_poll(from_id, self.selector.clone())
            .await?;

        while let Some(entry) = stream.next().await {
            let entry = entry?;

            if *cancel.borrow() {
                tracing::info!(consumer = %self.consumer_name, "consume cancelled");
                return Ok(());
            }

            let prefix = entry.event.entity_prefix();
            if Self::EXCLUDES.contains(&prefix) {
                tracing::trace!(consumer = %self.consumer_name, entry_id = %entry.id, prefix, "skipping excluded entry");
                continue;
            }

            let entry_id = entry.id.clone();
            self.handler
                .handle(entry)
                .await
                .map_err(ConsumerError::Handler)?;

            if self.save_progress {
                self.consumer_client
                    .save_offset(self.consumer_name.clone(), entry_id)
                    .await?;
            }
        }

        tracing::info!(consumer = %self.consumer_name, "application-log stream ended");
        Ok(())
    }

    /// Run the consume loop on a spawned task, returning a handle that
    /// resolves when the stream terminates or cancellation is observed.
    #[must_use]
    pub fn spawn(self, cancel: watch::Receiver<bool>) -> JoinHandle<Result<(), ConsumerError>>
    where
        H: 'static,
    {
        tokio::spawn(async move { self.consume(cancel).await })
    }

    /// Resolve the log id the subscription starts from.
    async fn find_start_offset(&self) -> Result<String, ConsumerError> {
        match self.start {
            StartOffset::FromBeginning => Ok("1".to_string()),
            StartOffset::FromSaved => {
                match self
                    .consumer_client
                    .get_offset(self.consumer_name.clone())
                    .await
                {
                    Ok(offset) => {
                        let saved: u64 = offset
                            .parse()
                            .map_err(|_| ConsumerError::InvalidOffset(offset.clone()))?;
                        Ok((saved + 1).to_string())
                    }
                    Err(ConsumerStoreError::OffsetNotFound(_)) => Ok("1".to_string()),
                    Err(other) => Err(other.into()),
                }
            }
        }
    }
}
