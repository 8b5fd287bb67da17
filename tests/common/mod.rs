//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::PathBuf;

use http_echo_server::config::{ListenerConfig, ServerConfig};
use http_echo_server::http::HttpServer;
use http_echo_server::lifecycle::Shutdown;
use http_echo_server::net::Listener;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

/// A server running on an ephemeral local port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the accept loop to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        self.handle.await.unwrap().unwrap();
    }
}

/// Start a server with `config`, overriding the bind address to `127.0.0.1:0`.
pub async fn start_server(mut config: ServerConfig) -> TestServer {
    config.listener = ListenerConfig {
        bind_address: "127.0.0.1:0".into(),
        ..config.listener
    };
    config.shutdown.grace_period_secs = 1;

    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, rx).await });

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Start a server whose file routes use a fresh temp directory.
#[allow(dead_code)]
pub async fn start_file_server() -> (TestServer, PathBuf) {
    let dir = temp_dir();
    let mut config = ServerConfig::default();
    config.files.serving_directory = Some(dir.clone());
    (start_server(config).await, dir)
}

/// Fresh empty directory under the system temp dir.
pub fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("http-echo-server-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write `raw` to a fresh connection and read until the server closes it.
#[allow(dead_code)]
pub async fn raw_request(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    out
}

/// Like `raw_request`, returning the response as text.
#[allow(dead_code)]
pub async fn raw_request_text(addr: SocketAddr, raw: &str) -> String {
    String::from_utf8(raw_request(addr, raw.as_bytes()).await).unwrap()
}

/// HTTP client that opens a new connection per request; the server closes
/// every connection after one response.
#[allow(dead_code)]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
