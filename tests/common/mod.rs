//! Raw TCP test server speaking just enough HTTP/1.1 for the MCP flows.

#![allow(dead_code)]

use mcp_health::config::Config;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }

    pub fn rpc_method(&self) -> Option<String> {
        self.json()
            .get("method")
            .and_then(|m| m.as_str())
            .map(str::to_string)
    }
}

pub struct TestServer {
    pub base_url: String,
    pub port: u16,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
    pub connections: Arc<AtomicUsize>,
}

impl TestServer {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: self.port,
            connect_timeout: 2,
            call_timeout: 5,
            ..Config::default()
        }
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Read one request (head and Content-Length body) from the socket.
pub async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Start a server that answers every request with `handler(request)`, a
/// complete raw HTTP response, then closes the connection.
pub async fn start_test_server<F>(handler: F) -> TestServer
where
    F: Fn(&RecordedRequest) -> String + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let connections = Arc::new(AtomicUsize::new(0));
    let handler = Arc::new(handler);

    let requests_clone = Arc::clone(&requests);
    let connections_clone = Arc::clone(&connections);
    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            connections_clone.fetch_add(1, Ordering::SeqCst);
            let requests = Arc::clone(&requests_clone);
            let handler = Arc::clone(&handler);

            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                let response = handler(&request);
                requests.lock().unwrap().push(request);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.flush().await;
                let _ = socket.shutdown().await;
            });
        }
    });

    TestServer {
        base_url: format!("http://{}", addr),
        port: addr.port(),
        requests,
        connections,
    }
}

/// Start a legacy SSE server. `GET /sse` gets `announcement` immediately; the
/// `reply_chunks` are written to that same stream, with a short pause between
/// each, once a POST to the message endpoint has been received.
pub async fn start_sse_server(announcement: &str, reply_chunks: Vec<String>) -> TestServer {
    start_sse_server_with_ack(announcement, reply_chunks, "202 Accepted").await
}

/// Like [`start_sse_server`], answering the POST with `ack_status`.
pub async fn start_sse_server_with_ack(
    announcement: &str,
    reply_chunks: Vec<String>,
    ack_status: &str,
) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let connections = Arc::new(AtomicUsize::new(0));
    let posted = Arc::new(Notify::new());
    let announcement = announcement.to_string();
    let reply_chunks = Arc::new(reply_chunks);
    let ack_status = ack_status.to_string();

    let requests_clone = Arc::clone(&requests);
    let connections_clone = Arc::clone(&connections);
    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            connections_clone.fetch_add(1, Ordering::SeqCst);
            let requests = Arc::clone(&requests_clone);
            let posted = Arc::clone(&posted);
            let announcement = announcement.clone();
            let reply_chunks = Arc::clone(&reply_chunks);
            let ack_status = ack_status.clone();

            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                let is_stream = request.method == "GET" && request.path == "/sse";
                requests.lock().unwrap().push(request);

                if is_stream {
                    let head = "HTTP/1.1 200 OK\r\n\
                                Content-Type: text/event-stream\r\n\
                                Cache-Control: no-cache\r\n\
                                Connection: close\r\n\
                                \r\n";
                    let _ = socket.write_all(head.as_bytes()).await;
                    let _ = socket.write_all(announcement.as_bytes()).await;
                    let _ = socket.flush().await;

                    posted.notified().await;
                    for chunk in reply_chunks.iter() {
                        let _ = socket.write_all(chunk.as_bytes()).await;
                        let _ = socket.flush().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                } else {
                    let body = "Accepted";
                    let response = format!(
                        "HTTP/1.1 {}\r\n\
                         Content-Type: text/plain\r\n\
                         Content-Length: {}\r\n\
                         Connection: close\r\n\
                         \r\n\
                         {}",
                        ack_status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.flush().await;
                    posted.notify_one();
                }
                let _ = socket.shutdown().await;
            });
        }
    });

    TestServer {
        base_url: format!("http://{}", addr),
        port: addr.port(),
        requests,
        connections,
    }
}

/// 200 response carrying an SSE body, closed by the server.
pub fn sse_response(extra_headers: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/event-stream\r\n\
         {}\
         Connection: close\r\n\
         \r\n\
         {}",
        extra_headers, body
    )
}

pub fn json_response(extra_headers: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: application/json\r\n\
         {}\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        extra_headers,
        body.len(),
        body
    )
}

pub fn status_response(status_line: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\n\
         Content-Length: 0\r\n\
         Connection: close\r\n\
         \r\n",
        status_line
    )
}

/// A tools/call response wrapping `payload` in the tool result envelope.
pub fn health_envelope(id: u64, payload: &serde_json::Value) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": [{
            "content": [{
                "type": "text",
                "text": payload.to_string()
            }]
        }]
    })
    .to_string()
}

/// A port with nothing listening on it.
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
