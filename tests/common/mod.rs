//! Common test utilities and helpers
//!
//! Starts a mock Umeng endpoint on a random port. Every request is recorded
//! and answered with a canned body; paths under `/reject` answer with HTTP 400.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::Router;

pub const SUCCESS_RESPONSE: &str = r#"{"ret":"SUCCESS","data":{"msg_id":"uu12345"}}"#;
pub const REJECT_RESPONSE: &str = r#"{"ret":"FAIL","data":{"error_code":"2004"}}"#;

/// One request as seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    /// Value of the `sign` query parameter
    pub fn signature(&self) -> Option<&str> {
        self.query.as_deref()?.strip_prefix("sign=")
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

type Recorded = Arc<Mutex<Vec<RecordedRequest>>>;

/// Mock Umeng service running on a background thread
pub struct MockUmeng {
    pub base_url: String,
    requests: Recorded,
}

impl MockUmeng {
    pub fn start() -> Self {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        let requests: Recorded = Arc::default();
        let app = Router::new().fallback(record).with_state(requests.clone());

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                axum::serve(listener, app).await
            })
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The single request received so far
    pub fn only_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request, got {requests:?}");
        requests.into_iter().next().unwrap()
    }
}

async fn record(
    State(requests): State<Recorded>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let request = RecordedRequest {
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        content_type: headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body,
    };
    let rejected = request.path.starts_with("/reject");
    requests.lock().unwrap().push(request);

    if rejected {
        (StatusCode::BAD_REQUEST, REJECT_RESPONSE.to_string())
    } else {
        (StatusCode::OK, SUCCESS_RESPONSE.to_string())
    }
}

/// A local address nothing is listening on
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
