#![allow(dead_code)]

use kennel::app;
use kennel::runtime_config::RuntimeConfig;
use kennel::server::{HttpServer, ServerHandle};
use kennel::store::MemoryStore;
use kennel::views::ViewRenderer;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Coroutine stack and test-friendly log output, configured once per binary.
pub fn setup_runtime() {
    INIT.call_once(|| {
        may::config().set_stack_size(0x8000);
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();
    });
}

/// A server on a random local port over a fresh `MemoryStore`. Stopped on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<MemoryStore>,
    handle: Option<ServerHandle>,
}

impl TestServer {
    pub fn start() -> Self {
        Self::start_with_assets(None)
    }

    pub fn start_with_assets(assets: Option<&Path>) -> Self {
        setup_runtime();
        let store = Arc::new(MemoryStore::new());
        let app = app::build(
            Arc::clone(&store),
            ViewRenderer::embedded().unwrap(),
            assets,
            RuntimeConfig { stack_size: 0x8000 },
        )
        .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let handle = HttpServer(app.service).start(addr).unwrap();
        handle.wait_ready().unwrap();
        Self {
            addr,
            store,
            handle: Some(handle),
        }
    }

    pub fn get(&self, path: &str) -> TestResponse {
        self.send(&format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n"))
    }

    pub fn post_json(&self, path: &str, body: &serde_json::Value) -> TestResponse {
        self.post(path, "application/json", &body.to_string())
    }

    pub fn post_form(&self, path: &str, body: &str) -> TestResponse {
        self.post(path, "application/x-www-form-urlencoded", body)
    }

    pub fn post(&self, path: &str, content_type: &str, body: &str) -> TestResponse {
        self.send(&format!(
            "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        ))
    }

    pub fn send(&self, raw: &str) -> TestResponse {
        send_request(&self.addr, raw)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("body is not JSON ({e}): {}", self.body))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Send one raw HTTP/1.1 request and read exactly one response.
pub fn send_request(addr: &SocketAddr, raw: &str) -> TestResponse {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    stream.write_all(raw.as_bytes()).unwrap();

    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];
    loop {
        if let Some(resp) = parse_response(&buf) {
            return resp;
        }
        match stream.read(&mut tmp) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&tmp[..n]),
            Err(e) => panic!("read error: {e:?}"),
        }
    }
    parse_response(&buf).unwrap_or_else(|| {
        panic!(
            "incomplete response: {}",
            String::from_utf8_lossy(&buf)
        )
    })
}

/// A complete response in `buf`, or `None` if more bytes are needed.
pub fn parse_response(buf: &[u8]) -> Option<TestResponse> {
    let text = String::from_utf8_lossy(buf);
    let (head, body) = text.split_once("\r\n\r\n")?;
    let mut lines = head.lines();
    let status = lines
        .next()?
        .split_whitespace()
        .nth(1)?
        .parse()
        .ok()?;
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let length: usize = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse().ok())
        .unwrap_or(0);
    if body.len() < length {
        return None;
    }
    Some(TestResponse {
        status,
        headers,
        body: body[..length].to_string(),
    })
}
