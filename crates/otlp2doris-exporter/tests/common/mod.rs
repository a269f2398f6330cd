// In-process mock of the Doris Stream Load endpoint.
//
// Replies are scripted per table; once a table's script runs out it answers
// `{"Status":"Success"}`. Every request is recorded for inspection.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::put;
use axum::Router;
use otlp2doris_config::DorisConfig;

pub const SUCCESS: &str = r#"{"Status":"Success"}"#;
pub const FAIL: &str = r#"{"Status":"Fail"}"#;

#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with this body.
    Body(&'static str),
    /// Arbitrary status and body.
    Status(StatusCode, &'static str),
    /// Wait, then answer 200 with this body.
    Delayed(Duration, &'static str),
    /// 307 with a body to the same table on the `/be` prefix.
    Redirect,
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub table: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn label(&self) -> &str {
        self.header("label").unwrap_or_default()
    }

    pub fn rows(&self) -> Vec<serde_json::Value> {
        serde_json::from_slice(&self.body).expect("body is a JSON array")
    }
}

#[derive(Default)]
struct MockState {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<Recorded>>,
}

pub struct MockDoris {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockDoris {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/api/:db/:table/_stream_load", put(stream_load))
            .route("/be/api/:db/:table/_stream_load", put(stream_load))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        Self { addr, state }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> DorisConfig {
        DorisConfig {
            endpoint: self.endpoint(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Queue replies for `table`.
    pub fn script(&self, table: &str, replies: impl IntoIterator<Item = Reply>) {
        self.state
            .scripts
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(replies);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, table: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.table == table)
            .collect()
    }
}

async fn stream_load(
    State(state): State<Arc<MockState>>,
    Path((db, table)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let reply = state
        .scripts
        .lock()
        .unwrap()
        .get_mut(&table)
        .and_then(VecDeque::pop_front)
        .unwrap_or(Reply::Body(SUCCESS));

    state.requests.lock().unwrap().push(Recorded {
        path: uri.path().to_string(),
        table: table.clone(),
        headers,
        body,
    });

    match reply {
        Reply::Body(body) => (StatusCode::OK, body).into_response(),
        Reply::Status(status, body) => (status, body).into_response(),
        Reply::Delayed(delay, body) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, body).into_response()
        }
        Reply::Redirect => (
            StatusCode::TEMPORARY_REDIRECT,
            [(
                header::LOCATION,
                format!("/be/api/{}/{}/_stream_load", db, table),
            )],
            "redirecting to backend",
        )
            .into_response(),
    }
}
