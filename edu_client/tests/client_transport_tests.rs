//! Transport behaviour of `ApiClient` against a recording server.

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{Method, StatusCode};
use bytes::Bytes;
use edu_client::api::{LoginRequest, Subject};
use edu_client::client::{ProgressFn, UploadFile};
use edu_client::{ClientConfig, ClientError, FileTokenStore, Session, TokenStore};
use futures::stream;
use serde_json::json;
use support::RecordingServer;

fn counting_session(token: Option<&str>) -> (Session, Arc<AtomicUsize>, Arc<Mutex<Vec<String>>>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let paths = Arc::new(Mutex::new(Vec::new()));
    let (c, p) = (Arc::clone(&calls), Arc::clone(&paths));
    let session = match token {
        Some(t) => Session::with_token(t),
        None => Session::in_memory(),
    }
    .on_unauthorized(move |path| {
        c.fetch_add(1, Ordering::SeqCst);
        p.lock().unwrap().push(path.to_string());
    });
    (session, calls, paths)
}

fn recording_progress() -> (ProgressFn, Arc<Mutex<Vec<u8>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (Box::new(move |p| sink.lock().unwrap().push(p)), seen)
}

#[tokio::test]
async fn test_bearer_token_attached_when_present() {
    let server = RecordingServer::start().await;
    let client = server.client(Session::with_token("abc123"));

    let _ = client.subjects().get_all().await;

    let request = server.last_request();
    assert_eq!(request.header("authorization"), Some("Bearer abc123"));
    assert_eq!(request.header("content-type"), Some("application/json"));
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let server = RecordingServer::start().await;
    let client = server.client(Session::in_memory());

    let _ = client.subjects().get_all().await;

    assert!(server.last_request().header("authorization").is_none());
}

#[tokio::test]
async fn test_unauthorized_clears_token_and_calls_hook_once() {
    let server = RecordingServer::start().await;
    server.respond(
        Method::GET,
        "/subjects",
        StatusCode::UNAUTHORIZED,
        json!({"code": "UNAUTHORIZED", "message": "Token expired"}),
    );
    let (session, calls, paths) = counting_session(Some("stale"));
    let client = server.client(session);

    let err = client.subjects().get_all().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.api_error().unwrap().message, "Token expired");
    assert!(!client.session().is_authenticated());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*paths.lock().unwrap(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_failed_login_also_tears_down() {
    let server = RecordingServer::start().await;
    server.respond(
        Method::POST,
        "/auth/login",
        StatusCode::UNAUTHORIZED,
        json!({"code": "UNAUTHORIZED", "message": "Invalid email or password"}),
    );
    let (session, calls, _) = counting_session(None);
    let client = server.client(session);

    let credentials = LoginRequest {
        email: "x@y.z".into(),
        password: "bad".into(),
    };
    assert!(client.auth().login(&credentials).await.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_custom_login_path_is_passed_to_hook() {
    let server = RecordingServer::start().await;
    server.respond(Method::GET, "/subjects", StatusCode::UNAUTHORIZED, json!(null));
    let (session, _, paths) = counting_session(Some("t"));
    let config = ClientConfig::new(server.base_url()).with_login_path("/signin");
    let client = edu_client::ApiClient::new(config, session).unwrap();

    let _ = client.subjects().get_all().await;

    assert_eq!(*paths.lock().unwrap(), vec!["/signin".to_string()]);
}

#[tokio::test]
async fn test_other_errors_keep_the_session() {
    let server = RecordingServer::start().await;
    server.respond(
        Method::GET,
        "/subjects/missing",
        StatusCode::NOT_FOUND,
        json!({"code": "NOT_FOUND", "message": "Subject not found"}),
    );
    let (session, calls, _) = counting_session(Some("t"));
    let client = server.client(session);

    let err = client.subjects().get_by_id("missing").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
    assert!(client.session().is_authenticated());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_login_stores_token() {
    let server = RecordingServer::start().await;
    server.respond(
        Method::POST,
        "/auth/login",
        StatusCode::OK,
        json!({
            "user": {"id": "u1", "email": "a@b.c", "name": "A", "role": "teacher",
                     "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"},
            "token": "fresh"
        }),
    );
    let client = server.client(Session::in_memory());

    let credentials = LoginRequest {
        email: "a@b.c".into(),
        password: "pw".into(),
    };
    let response = client.auth().login(&credentials).await.unwrap();

    assert_eq!(response.token, "fresh");
    assert_eq!(client.session().token().as_deref(), Some("fresh"));
    assert_eq!(
        server.last_request().json(),
        json!({"email": "a@b.c", "password": "pw"})
    );
}

#[tokio::test]
async fn test_shape_mismatch_is_decode_error() {
    let server = RecordingServer::start().await;
    server.respond(Method::GET, "/subjects", StatusCode::OK, json!({"not": "a list"}));
    let client = server.client(Session::in_memory());

    let result: Result<Vec<Subject>, _> = client.subjects().get_all().await;
    assert!(matches!(result, Err(ClientError::Decode { .. })));
}

#[tokio::test]
async fn test_empty_delete_body_is_none() {
    let server = RecordingServer::start().await;
    let client = server.client(Session::with_token("t"));

    let ack = client.subjects().delete("s1").await.unwrap();
    assert!(ack.is_none());
    let request = server.last_request();
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.path, "/subjects/s1");
}

#[tokio::test]
async fn test_upload_progress_is_monotonic_and_ends_at_100() {
    let server = RecordingServer::start().await;
    let client = server.client(Session::with_token("t"));
    let (progress, seen) = recording_progress();

    let data = vec![42u8; 200 * 1024];
    let upload = UploadFile::from_bytes("notes.pdf", data).with_mime("application/pdf");
    let _ = client
        .subjects()
        .upload_material("physics", upload, Some(progress))
        .await;

    let seen = seen.lock().unwrap().clone();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!(seen.iter().all(|p| *p <= 100));
    assert_eq!(seen.last(), Some(&100));

    let request = server.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/subjects/physics/materials");
    let content_type = request.header("content-type").unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"notes.pdf\""));
}

#[tokio::test]
async fn test_upload_without_total_reports_nothing() {
    let server = RecordingServer::start().await;
    let client = server.client(Session::with_token("t"));
    let (progress, seen) = recording_progress();

    let chunks = vec![
        Ok::<_, std::io::Error>(Bytes::from_static(b"hello ")),
        Ok(Bytes::from_static(b"world")),
    ];
    let upload = UploadFile::from_stream("hello.txt", stream::iter(chunks), None);
    let _ = client
        .subjects()
        .upload_material("physics", upload, Some(progress))
        .await;

    assert!(seen.lock().unwrap().is_empty());
    assert!(String::from_utf8_lossy(&server.last_request().body).contains("hello world"));
}

#[tokio::test]
async fn test_timeout_is_reported() {
    // The listener never accepts, so the request stalls.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = ClientConfig::new(format!("http://{}/api", addr))
        .with_timeout(Duration::from_millis(200));
    let client = edu_client::ApiClient::new(config, Session::in_memory()).unwrap();

    let err = client.subjects().get_all().await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {:?}", err);
    drop(listener);
}

#[tokio::test]
async fn test_file_token_store_survives_client_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let server = RecordingServer::start().await;

    let store = FileTokenStore::new(&path);
    store.store("persisted").unwrap();

    let client = server.client(Session::new(FileTokenStore::new(&path)));
    let _ = client.game().get_leaderboard(None).await;
    assert_eq!(
        server.last_request().header("authorization"),
        Some("Bearer persisted")
    );
}
