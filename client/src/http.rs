//! HTTP implementations of the two backend traits.
//!
//! The event store and the consumer-offset store are external services; this
//! module talks JSON over HTTP to them. Log polling is a long-lived response
//! whose body is newline-delimited JSON, decoded incrementally into
//! [`AppLogEntry`] items.

use async_stream::stream;
use crudstore_core::consumer_store::{ConsumerStore, ConsumerStoreError};
use crudstore_core::event::{AppLogEntry, Event};
use crudstore_core::event_store::{EventStore, EventStoreError, LogStream, StoreFuture};
use crudstore_core::originator::Originator;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct AppendEventRequest<'a> {
    event: &'a Event,
}

#[derive(Serialize)]
struct GetEventsRequest<'a> {
    originator: &'a Originator,
}

#[derive(Deserialize)]
struct GetEventsResponse {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Deserialize)]
struct OffsetResponse {
    offset: String,
}

#[derive(Serialize)]
struct SaveOffsetRequest<'a> {
    offset: &'a str,
}

fn normalize_base(uri: &str) -> String {
    uri.trim_end_matches('/').to_string()
}

/// HTTP client for the event-store service.
///
/// A single instance is created at startup and shared for the process
/// lifetime; `reqwest::Client` pools connections internally.
#[derive(Clone)]
pub struct HttpEventStore {
    client: Client,
    base_url: String,
}

impl HttpEventStore {
    /// Create a client for the store at `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base(base_url),
        }
    }

    /// Liveness probe against the store's `/healtz` endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::Transport`] when the store is unreachable
    /// or unhealthy.
    pub async fn healtz(&self) -> Result<(), EventStoreError> {
        let response = self
            .client
            .get(format!("{}/healtz", self.base_url))
            .send()
            .await
            .map_err(|e| EventStoreError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(EventStoreError::Transport(format!(
                "event store unhealthy: {}",
                response.status()
            )))
        }
    }
}

impl EventStore for HttpEventStore {
    fn append(&self, event: Event) -> StoreFuture<'_, Result<(), EventStoreError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(format!("{}/v1/events/append", self.base_url))
                .json(&AppendEventRequest { event: &event })
                .send()
                .await
                .map_err(|e| EventStoreError::Transport(e.to_string()))?;

            match response.status() {
                status if status.is_success() => Ok(()),
                StatusCode::CONFLICT => Err(EventStoreError::Concurrency {
                    id: event.originator.id.clone(),
                    version: event.originator.version.clone(),
                }),
                status => {
                    let body = response.text().await.unwrap_or_default();
                    Err(EventStoreError::Transport(format!(
                        "append failed with {status}: {body}"
                    )))
                }
            }
        })
    }

    fn get_events(
        &self,
        originator: Originator,
    ) -> StoreFuture<'_, Result<Vec<Event>, EventStoreError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(format!("{}/v1/events/get", self.base_url))
                .json(&GetEventsRequest {
                    originator: &originator,
                })
                .send()
                .await
                .map_err(|e| EventStoreError::Transport(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(EventStoreError::Transport(format!(
                    "get events failed with {status}: {body}"
                )));
            }

            let body: GetEventsResponse = response
                .json()
                .await
                .map_err(|e| EventStoreError::InvalidResponse(e.to_string()))?;
            Ok(body.events)
        })
    }

    fn logs_poll(
        &self,
        from_id: String,
        selector: String,
    ) -> StoreFuture<'_, Result<LogStream, EventStoreError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(format!("{}/v1/logs/poll", self.base_url))
                .query(&[("from_id", from_id.as_str()), ("selector", selector.as_str())])
                .send()
                .await
                .map_err(|e| EventStoreError::Transport(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(EventStoreError::Transport(format!(
                    "logs poll failed with {status}: {body}"
                )));
            }

            let byte_stream = response.bytes_stream();

            let entries = stream! {
                let mut buffer = String::new();

                for await chunk in byte_stream {
                    let chunk = match chunk {
                        Ok(chunk) => chunk,
                        Err(e) => {
                            yield Err(EventStoreError::Transport(e.to_string()));
                            return;
                        }
                    };

                    match std::str::from_utf8(&chunk) {
                        Ok(text) => buffer.push_str(text),
                        Err(e) => {
                            yield Err(EventStoreError::InvalidResponse(format!(
                                "log stream is not utf-8: {e}"
                            )));
                            return;
                        }
                    }

                    while let Some(newline) = buffer.find('\n') {
                        let line = buffer[..newline].trim().to_string();
                        buffer.drain(..=newline);
                        if line.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<AppLogEntry>(&line) {
                            Ok(entry) => yield Ok(entry),
                            Err(e) => {
                                yield Err(EventStoreError::InvalidResponse(format!(
                                    "undecodable log entry: {e}"
                                )));
                                return;
                            }
                        }
                    }
                }

                // A final entry may arrive without a trailing newline.
                let tail = buffer.trim();
                if !tail.is_empty() {
                    match serde_json::from_str::<AppLogEntry>(tail) {
                        Ok(entry) => yield Ok(entry),
                        Err(e) => yield Err(EventStoreError::InvalidResponse(format!(
                            "undecodable log entry: {e}"
                        ))),
                    }
                }
            };

            Ok(entries.boxed())
        })
    }
}

/// HTTP client for the consumer-offset service.
#[derive(Clone)]
pub struct HttpConsumerStore {
    client: Client,
    base_url: String,
}

impl HttpConsumerStore {
    /// Create a client for the store at `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base(base_url),
        }
    }

    /// Liveness probe against the store's `/healtz` endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerStoreError::Transport`] when the store is
    /// unreachable or unhealthy.
    pub async fn healtz(&self) -> Result<(), ConsumerStoreError> {
        let response = self
            .client
            .get(format!("{}/healtz", self.base_url))
            .send()
            .await
            .map_err(|e| ConsumerStoreError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ConsumerStoreError::Transport(format!(
                "consumer store unhealthy: {}",
                response.status()
            )))
        }
    }
}

impl ConsumerStore for HttpConsumerStore {
    fn get_offset(
        &self,
        consumer_id: String,
    ) -> StoreFuture<'_, Result<String, ConsumerStoreError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(format!(
                    "{}/v1/consumers/{consumer_id}/offset",
                    self.base_url
                ))
                .send()
                .await
                .map_err(|e| ConsumerStoreError::Transport(e.to_string()))?;

            match response.status() {
                status if status.is_success() => {
                    let body: OffsetResponse = response
                        .json()
                        .await
                        .map_err(|e| ConsumerStoreError::InvalidResponse(e.to_string()))?;
                    Ok(body.offset)
                }
                StatusCode::NOT_FOUND => Err(ConsumerStoreError::OffsetNotFound(consumer_id)),
                status => {
                    let body = response.text().await.unwrap_or_default();
                    Err(ConsumerStoreError::Transport(format!(
                        "get offset failed with {status}: {body}"
                    )))
                }
            }
        })
    }

    fn save_offset(
        &self,
        consumer_id: String,
        offset: String,
    ) -> StoreFuture<'_, Result<(), ConsumerStoreError>> {
        Box::pin(async move {
            let response = self
                .client
                .put(format!(
                    "{}/v1/consumers/{consumer_id}/offset",
                    self.base_url
                ))
                .json(&SaveOffsetRequest { offset: &offset })
                .send()
                .await
                .map_err(|e| ConsumerStoreError::Transport(e.to_string()))?;

            if response.status().is_success() {
                Ok(())
            } else {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Err(ConsumerStoreError::Transport(format!(
                    "save offset failed with {status}: {body}"
                )))
            }
        })
    }
}
