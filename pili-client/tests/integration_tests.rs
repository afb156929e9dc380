//! Integration tests for pili-client
//!
//! These run the real reqwest transport against a local mock Pili server.
//!
//! Run with: cargo test --test integration_tests

use pili_client::pili_core::{ErrorKind, Mac};
use pili_client::{Client, ClientConfig, ClientError, SaveasOptions};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a client pointed at the mock server
fn create_test_client(server: &MockServer) -> Client {
    let host = server
        .uri()
        .trim_start_matches("http://")
        .to_string();
    let config = ClientConfig::default().with_api_host(host);
    Client::new(Mac::new("test-ak", "test-sk").expect("valid mac"), config).expect("valid client")
}

#[tokio::test]
async fn test_create_and_info() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/hubs/PiliSDKTest/streams"))
        .and(header_regex("authorization", "^Qiniu test-ak:[A-Za-z0-9_-]{27}=$"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"key": "stream1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    // base64url("stream1") == "c3RyZWFtMQ=="
    Mock::given(method("GET"))
        .and(path("/v2/hubs/PiliSDKTest/streams/c3RyZWFtMQ=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "createdAt": 1488359300,
            "updatedAt": 1488359300,
            "expireAt": 1495959300,
            "disabledTill": 0,
            "converts": ["480p"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let stream = client.hub("PiliSDKTest").create("stream1").await.unwrap();
    let info = stream.info().await.unwrap();

    assert_eq!(info.key, "stream1");
    assert!(!info.is_disabled_at(1_500_000_000));
    assert_eq!(info.converts, vec!["480p"]);
}

#[tokio::test]
async fn test_create_existing_stream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/hubs/PiliSDKTest/streams"))
        .respond_with(ResponseTemplate::new(614).set_body_json(json!({"error": "stream already exists"})))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client.hub("PiliSDKTest").create("dup").await.unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::AlreadyExists));
    assert!(pili_client::is_exists(&err));
    assert!(!pili_client::is_not_exists(&err));
    assert_eq!(
        err.to_string(),
        "already exists (status 614): stream already exists"
    );
}

#[tokio::test]
async fn test_missing_stream() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/hubs/PiliSDKTest/streams/bm9wZQ=="))
        .respond_with(ResponseTemplate::new(612).set_body_json(json!({"error": "stream not found"})))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client.hub("PiliSDKTest").stream("nope").info().await.unwrap_err();
    assert!(pili_client::is_not_exists(&err));
}

#[tokio::test]
async fn test_live_status_and_recording_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/hubs/h/streams/aw==/live"))
        .respond_with(ResponseTemplate::new(619).set_body_json(json!({"error": "no live"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/hubs/h/streams/aw==/saveas"))
        .and(body_json(json!({"pipeline": "notexist"})))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "no such pipeline"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/hubs/h/streams/aw==/saveas"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(619).set_body_json(json!({"error": "no data"})))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let stream = client.hub("h").stream("k");

    let err = stream.live_status().await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NoActiveLiveSession));

    let opts = SaveasOptions {
        pipeline: "notexist".to_string(),
        ..SaveasOptions::default()
    };
    let err = stream.saveas(Some(&opts)).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::PipelineNotFound));

    let err = stream.save(0, 0).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NoRecordedData));
}

#[tokio::test]
async fn test_unmapped_code_keeps_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/hubs/h/streams"))
        .and(query_param("liveonly", "true"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client.hub("h").list_live("", 0, "").await.unwrap_err();

    match err {
        ClientError::Api(api) => {
            assert_eq!(api.kind(), ErrorKind::Api);
            assert_eq!(api.status(), Some(500));
            assert_eq!(api.message(), "internal");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Reserve a free port, then close it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let config = ClientConfig::default().with_api_host(addr.to_string());
    let client = Client::new(Mac::new("test-ak", "test-sk").expect("valid mac"), config).expect("valid client");

    let err = client.hub("h").stream("k").info().await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Transport));
}
