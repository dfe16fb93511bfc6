//! Shared helpers for tests that talk to a stub completion service.

use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::core::chat_stream::CompletionGateway;

/// Request head and body as received by the stub.
pub type CapturedRequest = Arc<Mutex<Option<(String, Vec<u8>)>>>;

/// One SSE `data:` event carrying a content delta.
pub fn delta(content: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"choices": [{"delta": {"content": content}}]})
    )
}

pub fn sse_response(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

/// Serves one HTTP exchange: records the request head and body, then writes
/// `response` verbatim and closes the connection. Returns a base URL ending
/// in `/v1/`.
pub async fn serve_once(response: String) -> (String, CapturedRequest) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");
    let captured: CapturedRequest = Arc::new(Mutex::new(None));
    let captured_for_server = Arc::clone(&captured);

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buffer = Vec::new();
        let header_end = loop {
            let mut chunk = [0_u8; 1024];
            let read = socket.read(&mut chunk).await.expect("read");
            assert!(read > 0, "unexpected EOF while reading headers");
            buffer.extend_from_slice(&chunk[..read]);
            if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.eq_ignore_ascii_case("content-length") {
                    value.trim().parse::<usize>().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0);
        while buffer.len() < header_end + content_length {
            let mut chunk = [0_u8; 1024];
            let read = socket.read(&mut chunk).await.expect("read body");
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);
        }
        *captured_for_server.lock().await = Some((head, buffer[header_end..].to_vec()));

        socket
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        let _ = socket.shutdown().await;
    });

    (format!("http://{addr}/v1/"), captured)
}

pub fn test_gateway(base_url: &str) -> CompletionGateway {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("client");
    CompletionGateway::new(client, base_url, "test-key", "gpt-4o-mini")
}

/// Decodes the JSON body of a captured request.
pub async fn captured_json(captured: &CapturedRequest) -> serde_json::Value {
    let (_, body) = captured
        .lock()
        .await
        .clone()
        .expect("request captured");
    serde_json::from_slice(&body).expect("json body")
}
