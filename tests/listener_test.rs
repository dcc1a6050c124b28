//! Listener lifecycle over a real loopback socket.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use todo_api::api::{create_router, AppState};
use todo_api::config::Config;
use todo_api::infra::StoreSession;
use todo_api::server::ListenerHandle;

fn test_app() -> Router {
    let config = Config::from_lookup(|key| match key {
        "DB_USER" | "DB_PASSWORD" | "DB_NAME" => Some("x".to_string()),
        _ => None,
    })
    .unwrap();
    let state = AppState::from_session(Arc::new(StoreSession::new()));
    create_router(state, Router::new(), &config).unwrap()
}

async fn raw_get(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        path
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

/// Body of a raw HTTP/1.1 response, decoding chunked transfer encoding.
fn response_body(raw: &str) -> String {
    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    if !head.to_ascii_lowercase().contains("transfer-encoding: chunked") {
        return body.to_string();
    }

    let mut decoded = String::new();
    let mut rest = body;
    loop {
        let (size_line, after) = rest.split_once("\r\n").unwrap();
        let size = usize::from_str_radix(size_line.trim(), 16).unwrap();
        if size == 0 {
            return decoded;
        }
        decoded.push_str(&after[..size]);
        rest = &after[size + 2..];
    }
}

#[tokio::test]
async fn test_listener_serves_healthcheck() {
    let listener = ListenerHandle::bind("127.0.0.1:0", test_app()).await.unwrap();

    let response = raw_get(listener.local_addr(), "/api/healthcheck").await;

    assert!(response.starts_with("HTTP/1.1 200"));
    assert_eq!(response_body(&response), "Access Granted");

    listener.shutdown(Duration::from_secs(1)).await.unwrap();
}

#[tokio::test]
async fn test_store_errors_become_responses() {
    let listener = ListenerHandle::bind("127.0.0.1:0", test_app()).await.unwrap();

    // The session was never opened, so the request fails but the listener lives on
    let response = raw_get(listener.local_addr(), "/api/users").await;
    assert!(response.starts_with("HTTP/1.1 503"));
    assert!(response.contains("STORE_CONNECTION_ERROR"));

    let response = raw_get(listener.local_addr(), "/api/healthcheck").await;
    assert!(response.starts_with("HTTP/1.1 200"));

    listener.shutdown(Duration::from_secs(1)).await.unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_accepting_within_bound() {
    let listener = ListenerHandle::bind("127.0.0.1:0", test_app()).await.unwrap();
    let addr = listener.local_addr();

    tokio::time::timeout(Duration::from_secs(5), listener.shutdown(Duration::from_secs(2)))
        .await
        .expect("shutdown hung")
        .unwrap();

    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_bind_conflict_is_reported() {
    let first = ListenerHandle::bind("127.0.0.1:0", test_app()).await.unwrap();
    let taken = first.local_addr().to_string();

    assert!(ListenerHandle::bind(&taken, test_app()).await.is_err());

    first.shutdown(Duration::from_secs(1)).await.unwrap();
}
