//! HTTP client behavior against a mock backend.

#![allow(clippy::unwrap_used)]

use crudstore_client::{CombinedClient, HttpConsumerStore, HttpEventStore};
use crudstore_core::consumer_store::{ConsumerStore, ConsumerStoreError};
use crudstore_core::event::Event;
use crudstore_core::event_store::{EventStore, EventStoreError};
use crudstore_core::originator::Originator;
use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_event(version: &str) -> Event {
    Event {
        originator: Originator::new("8c9d5bcb-1111-4a7a-9db0-6a48eec52e0a", version),
        event_type: "User.Created".to_string(),
        payload: r#"{"name":"alice"}"#.to_string(),
        occurred_on: 1_735_689_600,
    }
}

#[tokio::test]
async fn append_posts_the_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/events/append"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpEventStore::new(&server.uri());
    store.append(sample_event("1")).await.unwrap();
}

#[tokio::test]
async fn append_conflict_surfaces_concurrency() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/events/append"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let store = HttpEventStore::new(&server.uri());
    let err = store.append(sample_event("2")).await.unwrap_err();
    assert!(matches!(err, EventStoreError::Concurrency { ref version, .. } if version == "2"));
}

#[tokio::test]
async fn get_events_decodes_the_stream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/events/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [
                {
                    "originator": {"id": "abc", "version": "1"},
                    "event_type": "User.Created",
                    "payload": "{}",
                    "occurred_on": 1
                },
                {
                    "originator": {"id": "abc", "version": "2"},
                    "event_type": "User.Updated",
                    "payload": "[]",
                    "occurred_on": 2
                }
            ]
        })))
        .mount(&server)
        .await;

    let store = HttpEventStore::new(&server.uri());
    let events = store.get_events(Originator::latest("abc")).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].originator.version, "2");
}

#[tokio::test]
async fn get_events_empty_result_is_valid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/events/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"events": []})))
        .mount(&server)
        .await;

    let store = HttpEventStore::new(&server.uri());
    let events = store.get_events(Originator::latest("ghost")).await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn logs_poll_decodes_ndjson_lines() {
    let entry = |id: &str| {
        json!({
            "id": id,
            "event": {
                "originator": {"id": "abc", "version": "1"},
                "event_type": "User.Created",
                "payload": "{}",
                "occurred_on": 1
            }
        })
    };
    let body = format!("{}\n{}\n", entry("1"), entry("2"));

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/logs/poll"))
        .and(query_param("from_id", "1"))
        .and(query_param("selector", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let store = HttpEventStore::new(&server.uri());
    let stream = store
        .logs_poll("1".to_string(), "*".to_string())
        .await
        .unwrap();
    let ids: Vec<String> = stream.map(|entry| entry.unwrap().id).collect().await;
    assert_eq!(ids, vec!["1", "2"]);
}

#[tokio::test]
async fn logs_poll_handles_missing_trailing_newline() {
    let body = json!({
        "id": "7",
        "event": {
            "originator": {"id": "abc", "version": "1"},
            "event_type": "User.Created",
            "payload": "{}",
            "occurred_on": 1
        }
    })
    .to_string();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/logs/poll"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let store = HttpEventStore::new(&server.uri());
    let stream = store
        .logs_poll("1".to_string(), "*".to_string())
        .await
        .unwrap();
    let ids: Vec<String> = stream.map(|entry| entry.unwrap().id).collect().await;
    assert_eq!(ids, vec!["7"]);
}

#[tokio::test]
async fn missing_offset_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/consumers/reader/offset"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = HttpConsumerStore::new(&server.uri());
    let err = store.get_offset("reader".to_string()).await.unwrap_err();
    assert!(matches!(err, ConsumerStoreError::OffsetNotFound(ref name) if name == "reader"));
}

#[tokio::test]
async fn offset_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/consumers/reader/offset"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/consumers/reader/offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"offset": "3"})))
        .mount(&server)
        .await;

    let store = HttpConsumerStore::new(&server.uri());
    store
        .save_offset("reader".to_string(), "3".to_string())
        .await
        .unwrap();
    assert_eq!(store.get_offset("reader".to_string()).await.unwrap(), "3");
}

#[tokio::test]
async fn connect_probes_both_backends() {
    let store_server = MockServer::start().await;
    let consumer_server = MockServer::start().await;
    for server in [&store_server, &consumer_server] {
        Mock::given(method("GET"))
            .and(path("/healtz"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(server)
            .await;
    }

    CombinedClient::connect(&store_server.uri(), &consumer_server.uri())
        .await
        .unwrap();
}
