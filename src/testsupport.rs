//! Shared test fixtures for auth, SSE, and client test modules.
//!
//! Keeping tiny but reusable helpers here prevents each test module from
//! rebuilding ad-hoc temp dirs, token fixtures, and HTTP listeners.

use crate::api::ChunkSource;
use crate::auth::{JWT_ACCOUNT_ID_CLAIM, JWT_AUTH_CLAIM};
use crate::error::ApiError;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!(
            "codex-client-{prefix}-{}-{millis}-{suffix}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    /// Root directory path for this fixture.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build a child path under the fixture root.
    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write UTF-8 text to a child path, creating parent directories as needed.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// One SSE `data:` line as the Codex backend sends it.
pub fn sse_data_line(payload: &str) -> String {
    format!("data: {payload}\n")
}

/// Unsigned three-segment token whose payload segment encodes `payload`.
pub fn jwt_with_payload(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}

/// Token carrying `account_id` at the ChatGPT account claim path.
pub fn jwt_with_account_id(account_id: &str) -> String {
    jwt_with_payload(&json!({ JWT_AUTH_CLAIM: { JWT_ACCOUNT_ID_CLAIM: account_id } }))
}

/// Body portion of a raw HTTP request captured by [`MockHttpServer`].
pub fn request_body(raw: &str) -> &str {
    raw.split_once("\r\n\r\n").map_or("", |(_, body)| body)
}

/// One scripted HTTP response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    content_type: String,
    chunks: Vec<String>,
}

impl MockResponse {
    pub fn text(status: u16, content_type: &str, body: &str) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            chunks: vec![body.to_string()],
        }
    }

    pub fn json(status: u16, body: Value) -> Self {
        Self::text(status, "application/json", &body.to_string())
    }

    /// `200` event stream written in one piece.
    pub fn sse(body: String) -> Self {
        Self::sse_chunks(vec![body])
    }

    /// `200` event stream written as separate, slightly delayed writes.
    pub fn sse_chunks(chunks: Vec<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/event-stream".to_string(),
            chunks,
        }
    }

    fn head(&self) -> String {
        let length: usize = self.chunks.iter().map(String::len).sum();
        let reason = if self.status < 400 { "OK" } else { "Error" };
        format!(
            "HTTP/1.1 {} {reason}\r\nContent-Type: {}\r\nContent-Length: {length}\r\nConnection: close\r\n\r\n",
            self.status, self.content_type
        )
    }
}

/// Local HTTP/1.1 listener that replays scripted responses in order.
///
/// Each connection gets the next response (or a `500` once the script is
/// exhausted) and every raw request is recorded for assertions.
#[derive(Debug)]
pub struct MockHttpServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl MockHttpServer {
    pub async fn start(responses: Vec<MockResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);
        let handle = tokio::spawn(async move {
            let mut responses = VecDeque::from(responses);
            while let Ok((mut socket, _)) = listener.accept().await {
                let raw = read_http_request(&mut socket).await;
                log.lock().expect("request log").push(raw);
                let response = responses.pop_front().unwrap_or_else(|| {
                    MockResponse::text(500, "text/plain", "no scripted response left")
                });
                write_response(&mut socket, &response).await;
            }
        });
        Self {
            addr,
            requests,
            handle,
        }
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("request log").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("request log").len()
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Read headers plus a `Content-Length` body.
async fn read_http_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        if let Some(header_end) = find_header_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + length {
                break;
            }
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}

async fn write_response(socket: &mut TcpStream, response: &MockResponse) {
    if socket.write_all(response.head().as_bytes()).await.is_err() {
        return;
    }
    for (index, chunk) in response.chunks.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        if socket.write_all(chunk.as_bytes()).await.is_err() {
            return;
        }
        let _ = socket.flush().await;
    }
    let _ = socket.shutdown().await;
}

/// In-memory [`ChunkSource`] replaying fixed byte chunks.
#[derive(Debug, Default)]
pub struct ScriptedChunks {
    chunks: VecDeque<Vec<u8>>,
    fail_at_end: bool,
}

impl ScriptedChunks {
    pub fn from_strings(chunks: Vec<String>) -> Self {
        Self {
            chunks: chunks.into_iter().map(String::into_bytes).collect(),
            fail_at_end: false,
        }
    }

    /// Report a transport failure instead of a clean end of body.
    pub fn fail_at_end(mut self) -> Self {
        self.fail_at_end = true;
        self
    }
}

#[async_trait]
impl ChunkSource for ScriptedChunks {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, ApiError> {
        match self.chunks.pop_front() {
            Some(chunk) => Ok(Some(chunk)),
            None if self.fail_at_end => Err(ApiError::InvalidResponse(
                "connection reset mid-stream".to_string(),
            )),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_fixture_writes_and_resolves_paths() {
        let fixture = TestTempDir::new("fixture");
        let file = fixture.write_text("nested/file.txt", "hello");
        assert_eq!(fs::read_to_string(file).unwrap(), "hello");
        assert!(fixture.path().is_dir());
    }

    #[test]
    fn sse_helper_emits_data_line() {
        assert_eq!(sse_data_line("[DONE]"), "data: [DONE]\n");
    }

    #[test]
    fn jwt_fixture_has_three_segments() {
        let token = jwt_with_account_id("acct");
        assert_eq!(token.split('.').count(), 3);
        assert!(!token.contains('='));
    }

    #[tokio::test]
    async fn mock_server_records_requests_and_replays_responses() {
        let server = MockHttpServer::start(vec![MockResponse::json(201, json!({"ok": true}))]).await;
        let client = reqwest::Client::new();

        let first = client
            .post(server.url("/echo"))
            .body("payload")
            .send()
            .await
            .expect("first");
        assert_eq!(first.status().as_u16(), 201);
        assert_eq!(first.text().await.expect("body"), r#"{"ok":true}"#);

        let second = client.get(server.url("/again")).send().await.expect("second");
        assert_eq!(second.status().as_u16(), 500);

        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with("POST /echo "));
        assert_eq!(request_body(&requests[0]), "payload");
        assert!(requests[1].starts_with("GET /again "));
    }
}
