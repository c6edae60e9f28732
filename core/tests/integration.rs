//! Full list lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP through `ReqwestTransport`. Validates that
//! request building, header setup, response validation and decoding work
//! end-to-end with an independent server implementation.

use std::net::SocketAddr;

use ioclists_core::{ClientConfig, CreateListParameters, ErrorKind, FeedType, IocListsClient};

const API_KEY: &str = "integration-key";

async fn start_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { mock_server::run(listener, API_KEY).await });
    addr
}

fn client(addr: SocketAddr, api_key: &str) -> IocListsClient {
    let config = ClientConfig::new(api_key).with_base_url(format!("http://{addr}/v1"));
    IocListsClient::new(config).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn list_lifecycle() {
    let addr = start_server().await;
    let client = client(addr, API_KEY);

    // Step 1: create a list.
    let params = CreateListParameters::new("tester", "testing list")
        .with_description("This is a list created by the integration test.")
        .with_feed_type(FeedType::Content);
    client.create_list(&params).await.unwrap();

    // Step 2: creating it again is a service-reported input error.
    let err = client.create_list(&params).await.unwrap_err();
    match err.kind() {
        ErrorKind::BadRequest { status, message } => {
            assert_eq!(status, "error");
            assert_eq!(message, "list already exists");
        }
        other => panic!("unexpected kind {other:?}"),
    }
    assert_eq!(err.status_code(), Some(400));

    // Step 3: recent entries start empty.
    let recent = client.get_recent("tester", "testing list").await.unwrap();
    assert!(recent.is_empty());

    // Step 4: add entries.
    let before = chrono::Utc::now() - chrono::TimeDelta::seconds(5);
    client
        .add("tester", "testing list", "https://example[.]com -- Testing Indicator")
        .await
        .unwrap();
    client
        .add("tester", "testing list", "62.216.168.7 -- C2")
        .await
        .unwrap();
    client
        .add("tester", "testing list", "https://example[.]com -- duplicate")
        .await
        .unwrap();

    // Step 5: recent entries come back newest first with decoded timestamps.
    let recent = client.get_recent("tester", "testing list").await.unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].raw, "https://example[.]com -- duplicate");
    assert_eq!(recent[0].username, "tester");
    assert_eq!(recent[0].list_name, "testing list");
    assert!(recent.iter().all(|entry| entry.added_at > before));
    assert!(recent.iter().all(|entry| !entry.id.is_empty()));

    // Step 6: unique indicators arrive as plain text.
    let unique = client.get_unique("tester", "testing list").await.unwrap();
    assert_eq!(unique, vec!["https://example[.]com", "62.216.168.7"]);

    // Step 7: search across lists.
    let matches = client.search("62.216.168.7").await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].list_name, "testing list");

    let matches = client.search("not-present.example").await.unwrap();
    assert!(matches.is_empty());

    // Step 8: unknown list is an unexpected status.
    let err = client.get_recent("tester", "missing").await.unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnexpectedStatus { status: 404, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn wrong_api_key_is_unauthorized() {
    let addr = start_server().await;
    let client = client(addr, "wrong-key");

    let err = client.get_recent("tester", "list").await.unwrap_err();

    assert_eq!(err.kind(), &ErrorKind::Unauthorized);
    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.path(), Some("lists/tester/list/"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr, API_KEY).search("q").await.unwrap_err();

    assert_eq!(err.kind(), &ErrorKind::Transport);
    assert_eq!(err.status_code(), None);
}
