//! End-to-end client tests against a mock Umeng endpoint.
//!
//! Each test starts its own mock server on a random port and checks what
//! actually goes over the wire: path, content type, signature and body.

mod common;

use common::{closed_port_url, MockUmeng, REJECT_RESPONSE, SUCCESS_RESPONSE};
use serde_json::{json, Value};
use umeng_push::push::{MessageKind, Platform};
use umeng_push::shared::clients::sign::sign;
use umeng_push::shared::config::EndpointConfig;
use umeng_push::{AppError, UmengClient, UmengClientConfig};

fn client_for(endpoints: EndpointConfig) -> UmengClient {
    UmengClient::new(UmengClientConfig {
        endpoints,
        timeout_secs: Some(5),
        ..UmengClientConfig::new("ak1", "sec1")
    })
    .unwrap()
}

fn assert_signed(client: &UmengClient, url: &str, request: &common::RecordedRequest) {
    let expected = sign("POST", url, &request.body, "sec1");
    assert_eq!(request.signature(), Some(expected.as_str()));
    assert_eq!(client.sign(url, &request.body), expected);
}

#[test]
fn test_unicast_push_over_http() {
    let server = MockUmeng::start();
    let endpoints = EndpointConfig::with_base(&server.base_url);
    let client = client_for(endpoints.clone());

    let response = client
        .unicast(MessageKind::Notification)
        .device_token("t1,t2")
        .body("ticker", "hi")
        .policy("out_biz_no", "biz-1")
        .policy("expire_time", "2026-10-18 10:00:00")
        .push(Platform::Ios)
        .unwrap();

    assert_eq!(response, SUCCESS_RESPONSE);

    let request = server.only_request();
    assert_eq!(request.path, "/api/send");
    assert_eq!(request.content_type.as_deref(), Some("application/json;charset=utf-8"));
    assert_signed(&client, &endpoints.send, &request);

    let message = request.json();
    assert_eq!(message["appkey"], "ak1");
    assert_eq!(message["type"], "unicast");
    assert_eq!(message["device_tokens"], "t1");
    assert_eq!(message["payload"]["aps"], Value::Null);
    assert_eq!(message["policy"], json!({"expire_time": "2026-10-18 10:00:00"}));
    assert!(message["timestamp"].as_str().unwrap().parse::<i64>().is_ok());
}

#[test]
fn test_android_message_push_over_http() {
    let server = MockUmeng::start();
    let client = client_for(EndpointConfig::with_base(&server.base_url));

    client
        .broadcast(MessageKind::Message)
        .body("ticker", "dropped")
        .body("custom", json!({"action": "sync"}))
        .extra("order", "42")
        .policy("out_biz_no", "biz-1")
        .mode(false)
        .push(Platform::Android)
        .unwrap();

    let message = server.only_request().json();
    assert_eq!(message["type"], "broadcast");
    assert_eq!(message["production_mode"], "false");
    assert_eq!(
        message["payload"],
        json!({
            "display_type": "message",
            "body": {"custom": {"action": "sync"}},
            "extra": {"order": "42"}
        })
    );
    assert_eq!(message["policy"], json!({"out_biz_no": "biz-1"}));
}

#[test]
fn test_listcast_wire_fields() {
    let server = MockUmeng::start();
    let client = client_for(EndpointConfig::with_base(&server.base_url));

    client
        .listcast(MessageKind::Notification)
        .device_tokens("t1,t2,t3")
        .push(Platform::Android)
        .unwrap();

    let message = server.only_request().json();
    assert_eq!(message["devicd_tokens"], "t1,t2,t3");
    assert!(message.get("device_tokens").is_none());
}

#[test]
fn test_auxiliary_calls() {
    let server = MockUmeng::start();
    let endpoints = EndpointConfig::with_base(&server.base_url);
    let client = client_for(endpoints.clone());

    assert_eq!(client.status("us1").unwrap(), SUCCESS_RESPONSE);
    assert_eq!(client.cancel("us2").unwrap(), SUCCESS_RESPONSE);
    assert_eq!(client.upload("t1\nt2").unwrap(), SUCCESS_RESPONSE);

    let requests = server.requests();
    assert_eq!(requests.len(), 3);

    let expected = [
        ("/api/status", &endpoints.status, "task_id", "us1"),
        ("/api/cancel", &endpoints.cancel, "task_id", "us2"),
        ("/upload", &endpoints.upload, "content", "t1\nt2"),
    ];

    for (request, (path, url, key, value)) in requests.iter().zip(expected) {
        assert_eq!(request.path, path);
        assert_signed(&client, url, request);

        let message = request.json();
        let object = message.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(message["appkey"], "ak1");
        assert_eq!(message[key], value);
        assert!(message["timestamp"].is_string());
    }
}

#[test]
fn test_error_status_is_passed_through() {
    let server = MockUmeng::start();
    let endpoints = EndpointConfig {
        send: format!("{}/reject/api/send", server.base_url),
        ..EndpointConfig::with_base(&server.base_url)
    };
    let client = client_for(endpoints);

    let response = client
        .groupcast(MessageKind::Notification)
        .push(Platform::Android)
        .unwrap();

    assert_eq!(response, REJECT_RESPONSE);
}

#[test]
fn test_connection_refused_is_network_error() {
    let client = client_for(EndpointConfig::with_base(&closed_port_url()));

    match client.status("us1") {
        Err(err @ AppError::HttpRequest { .. }) => assert_eq!(err.category(), "network"),
        other => panic!("Expected HttpRequest error, got {:?}", other),
    }

    let push = client.filecast(MessageKind::Notification).file_id("PF1").push(Platform::Android);
    assert!(matches!(push, Err(AppError::HttpRequest { .. })));
}
