#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use edu_client::db::{repository::FullRepository, LocalRepository};
use edu_client::http::{create_router, AppState, API_PREFIX};
use edu_client::{ApiClient, ClientConfig, Session};
use serde_json::Value;
use tokio::net::TcpListener;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// One request as seen by [`RecordingServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path below the API prefix, e.g. `/subjects/1`
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }
}

type Canned = HashMap<(Method, String), (StatusCode, String)>;

#[derive(Clone, Default)]
struct Recorder {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responses: Arc<Mutex<Canned>>,
}

/// Catch-all HTTP server that records every request and answers with
/// canned responses (`200 null` unless configured otherwise).
pub struct RecordingServer {
    addr: SocketAddr,
    recorder: Recorder,
}

impl RecordingServer {
    pub async fn start() -> Self {
        let recorder = Recorder::default();
        let app = Router::new()
            .fallback(record)
            .with_state(recorder.clone());
        let addr = serve(app).await;
        Self { addr, recorder }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, API_PREFIX)
    }

    pub fn client(&self, session: Session) -> ApiClient {
        ApiClient::new(ClientConfig::new(self.base_url()), session).expect("client")
    }

    /// Answer `method path` with `status` and a JSON body.
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.recorder
            .responses
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorder.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request recorded")
    }
}

async fn record(
    State(recorder): State<Recorder>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();
    let canned = recorder
        .responses
        .lock()
        .unwrap()
        .get(&(method.clone(), path.clone()))
        .cloned();
    recorder.requests.lock().unwrap().push(RecordedRequest {
        method,
        path,
        query: uri.query().map(str::to_string),
        headers,
        body,
    });

    let (status, body) = canned.unwrap_or((StatusCode::OK, "null".to_string()));
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });
    addr
}

/// Start the mock API server on a free port; returns its API base URL.
pub async fn spawn_mock_server(repository: Arc<dyn FullRepository>) -> String {
    let addr = serve(create_router(AppState::new(repository))).await;
    format!("http://{}{}", addr, API_PREFIX)
}

/// Mock API server seeded with the demo data.
pub async fn spawn_demo_server() -> String {
    spawn_mock_server(Arc::new(LocalRepository::with_demo_data())).await
}

pub fn client_for(base_url: &str, session: Session) -> ApiClient {
    ApiClient::new(ClientConfig::new(base_url), session).expect("client")
}
