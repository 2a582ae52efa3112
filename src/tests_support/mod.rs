//! Test-only helpers: a minimal mock HTTP server used by integration tests
//! to drive [`crate::context::Context`] against scripted responses instead
//! of a live service (§8).

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a one-shot mock server: accepts a single connection, reads (and
/// discards) the request, writes `response` verbatim, then closes.
/// Returns the port it bound to.
pub async fn serve_once(response: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock listener");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept mock connection");
        let mut buf = [0u8; 4096];
        // Read until we've seen the blank line ending the request headers;
        // good enough for the small fixed requests these tests send.
        let mut seen = Vec::new();
        loop {
            let n = stream.read(&mut buf).await.expect("read mock request");
            if n == 0 {
                break;
            }
            seen.extend_from_slice(&buf[..n]);
            if seen.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        stream.write_all(response.as_bytes()).await.expect("write mock response");
        stream.shutdown().await.ok();
    });

    port
}

/// Start a one-shot mock server that accepts a connection and then never
/// replies, to exercise the transaction-timeout path (§4.4).
pub async fn serve_and_stall() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock listener");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept mock connection");
        // Hold the connection open without ever writing a response.
        std::mem::forget(stream);
    });

    port
}

/// Build a minimal `200 OK` response with a JSON body and a correct
/// `Content-Length`.
pub fn ok_json_response(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}
