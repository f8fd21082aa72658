//! End-to-end: real socket, raw HTTP/1.1, graceful shutdown.

use std::net::SocketAddr;

use auxi::{MethodHandlers, Request, Router, Server, StatusCode, SuccessResponse};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

async fn echo(req: Request) -> (StatusCode, SuccessResponse) {
    let mut data = serde_json::Map::new();
    data.insert("body".to_owned(), String::from_utf8_lossy(req.body()).into_owned().into());
    (StatusCode::OK, SuccessResponse::with_data(data, "echoed"))
}

async fn start() -> (SocketAddr, oneshot::Sender<()>, JoinHandle<Result<(), auxi::Error>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = Router::new().route("/echo", MethodHandlers::new().post(echo));

    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(Server::from_listener(listener).serve_with_shutdown(router, async {
        let _ = stopped.await;
    }));
    (addr, stop, server)
}

/// Sends one request with `Connection: close` and returns (status, headers, body).
async fn send(addr: SocketAddr, method: &str, path: &str, body: &str) -> (u16, String, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let raw = format!(
        "{method} {path} HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\ncontent-length: {}\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    let status = head.split(' ').nth(1).unwrap().parse().unwrap();
    (status, head.to_ascii_lowercase(), body.to_owned())
}

#[tokio::test]
async fn serves_envelopes_over_tcp() {
    let (addr, stop, server) = start().await;

    let (status, head, body) = send(addr, "POST", "/echo", "hello").await;
    assert_eq!(status, 200);
    assert!(head.contains("content-type: application/json"));
    assert!(head.contains("x-content-type-options: nosniff"));
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["body"], "hello");

    let (status, _, _) = send(addr, "GET", "/echo", "").await;
    assert_eq!(status, 404);

    let (status, head, _) = send(addr, "TRACE", "/echo", "").await;
    assert_eq!(status, 405);
    assert!(head.contains("allow: post"));

    let (status, _, _) = send(addr, "GET", "/missing", "").await;
    assert_eq!(status, 404);

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}

#[test]
fn bind_rejects_bad_address() {
    assert!(matches!(Server::bind("not an address"), Err(auxi::Error::Addr { .. })));
}
