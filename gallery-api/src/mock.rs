//! Mock static-site server for tests and local demos.
//!
//! Serves a fixed route table over plain HTTP/1.1. Each connection carries one
//! request and is closed after the response. Unknown paths get a 404.

use std::{
    collections::HashMap,
    io,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::oneshot,
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{
    DEFAULT_ITEMS_PATH,
    config::CONTENT_DIR,
    items::{Assets, Item, ItemType},
};

const MAX_REQUEST_HEAD: usize = 64 * 1024;

/// A canned response
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
    pub delay: Option<Duration>,
}

impl MockResponse {
    pub fn new(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            body: body.into(),
            delay: None,
        }
    }

    pub fn json(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, "application/json", body)
    }

    pub fn text(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, "text/plain; charset=utf-8", body)
    }

    /// Empty response with the given status
    pub fn status(status: u16) -> Self {
        Self::new(status, "text/plain; charset=utf-8", Vec::new())
    }

    #[must_use]
    pub fn delayed(self, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..self
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    routes: HashMap<String, MockResponse>,
    requests: Vec<String>,
}

impl MockState {
    // exact target first, then path without query
    fn lookup(&self, target: &str) -> Option<MockResponse> {
        self.routes
            .get(target)
            .or_else(|| {
                let path = target.split_once('?').map_or(target, |(path, _)| path);
                self.routes.get(path)
            })
            .cloned()
    }
}

/// Route table for a mock site
#[derive(Debug, Clone, Default)]
pub struct MockSiteServer {
    state: Arc<Mutex<MockState>>,
}

fn route_key(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

impl MockSiteServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a route. `path` may include a query string.
    #[must_use]
    pub fn route(self, path: &str, response: MockResponse) -> Self {
        self.set_route(path, response);
        self
    }

    pub fn set_route(&self, path: &str, response: MockResponse) {
        self.state.lock().routes.insert(route_key(path), response);
    }

    /// Serves `items` at `/data/items.json`.
    #[must_use]
    pub fn with_items(self, items: &[Item]) -> Self {
        let body = serde_json::to_vec(items).unwrap_or_default();
        self.route(DEFAULT_ITEMS_PATH, MockResponse::json(body))
    }

    /// Sample site: one item of each common kind plus an article body.
    pub fn sample() -> Self {
        let items = sample_items();
        Self::new().with_items(&items).route(
            "/content/notes.md",
            MockResponse::text("# Notes\n\nWorking notes on the synth build.\n"),
        )
    }

    /// Serves `data/items.json` and `content/*.md` from a project directory.
    pub async fn from_dir(root: &Path) -> io::Result<Self> {
        let server = Self::new();
        let items = tokio::fs::read(root.join(DEFAULT_ITEMS_PATH)).await?;
        server.set_route(DEFAULT_ITEMS_PATH, MockResponse::json(items));
        let content: PathBuf = root.join(CONTENT_DIR);
        if let Ok(mut entries) = tokio::fs::read_dir(&content).await {
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.ends_with(".md") {
                    let body = tokio::fs::read(entry.path()).await?;
                    server.set_route(
                        &format!("/{CONTENT_DIR}/{name}"),
                        MockResponse::new(200, "text/markdown; charset=utf-8", body),
                    );
                }
            }
        }
        Ok(server)
    }

    /// Binds `addr` (use port 0 for an ephemeral port) and serves until shutdown.
    pub async fn start(self, addr: SocketAddr) -> io::Result<MockSiteHandle> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let state = self.state.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => match accepted {
                        Ok((stream, _)) => {
                            let state = state.clone();
                            tokio::spawn(async move {
                                if let Err(err) = serve_connection(stream, state).await {
                                    debug!(error = %err, "mock connection failed");
                                }
                            });
                        }
                        Err(err) => warn!(error = %err, "mock accept failed"),
                    },
                }
            }
        });
        Ok(MockSiteHandle {
            addr,
            shutdown: shutdown_tx,
            task,
            state: self.state,
        })
    }
}

/// Handle to a running mock site
#[derive(Debug)]
pub struct MockSiteHandle {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
    state: Arc<Mutex<MockState>>,
}

impl MockSiteHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base url, without trailing slash
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Adds or replaces a route while running.
    pub fn set_route(&self, path: &str, response: MockResponse) {
        self.state.lock().routes.insert(route_key(path), response);
    }

    /// Request log as `METHOD target`
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().requests.clone()
    }

    /// Number of requests whose path (query ignored) is `path`
    pub fn hits(&self, path: &str) -> usize {
        let path = route_key(path);
        self.state
            .lock()
            .requests
            .iter()
            .filter_map(|line| line.split_once(' ').map(|(_, target)| target))
            .filter(|target| target.split_once('?').map_or(*target, |(p, _)| p) == path)
            .count()
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

async fn serve_connection(mut stream: TcpStream, state: Arc<Mutex<MockState>>) -> io::Result<()> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > MAX_REQUEST_HEAD {
            return write_response(&mut stream, false, &MockResponse::status(431)).await;
        }
    }
    let head = String::from_utf8_lossy(&buf);
    let mut parts = head.lines().next().unwrap_or_default().split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or("/").to_string();

    let response = {
        let mut state = state.lock();
        state.requests.push(format!("{method} {target}"));
        state.lookup(&target)
    }
    .unwrap_or_else(|| MockResponse::status(404));
    debug!(%method, %target, status = response.status, "mock request");

    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }
    write_response(&mut stream, method == "HEAD", &response).await
}

async fn write_response(stream: &mut TcpStream, head_only: bool, resp: &MockResponse) -> io::Result<()> {
    let reason = reqwest::StatusCode::from_u16(resp.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    let header = format!(
        "HTTP/1.1 {} {reason}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        resp.status,
        resp.content_type,
        resp.body.len()
    );
    stream.write_all(header.as_bytes()).await?;
    if !head_only {
        stream.write_all(&resp.body).await?;
    }
    stream.flush().await?;
    stream.shutdown().await
}

/// Items served by [`MockSiteServer::sample`]
pub fn sample_items() -> Vec<Item> {
    vec![
        Item::new("sunset")
            .with_type(ItemType::Picture)
            .with_title("Sunset over the bay")
            .with_date("2024-06-01")
            .with_tags(["photo", "travel"])
            .with_assets(Assets {
                image: Some("/thumbnails/sunset.jpg".into()),
                ..Default::default()
            }),
        Item::new("trailer")
            .with_type(ItemType::Movie)
            .with_title("Trailer")
            .with_date("2024-03-12")
            .with_tags(["video"])
            .with_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
        Item::new("loop")
            .with_type(ItemType::Music)
            .with_title("Night loop")
            .with_date("2023-11-30")
            .with_assets(Assets {
                wav: Some("/audio/loop.wav".into()),
                ..Default::default()
            }),
        Item::new("notes")
            .with_type(ItemType::Write)
            .with_title("Synth notes")
            .with_date("2024-01-20")
            .with_summary("Build log")
            .with_assets(Assets {
                md: Some("/content/notes.md".into()),
                ..Default::default()
            }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_prefers_exact_target() {
        let server = MockSiteServer::new()
            .route("/oembed", MockResponse::status(500))
            .route("/oembed?url=a", MockResponse::text("a"));
        let state = server.state.lock();
        assert_eq!(state.lookup("/oembed?url=a").map(|r| r.status), Some(200));
        assert_eq!(state.lookup("/oembed?url=b").map(|r| r.status), Some(500));
        assert!(state.lookup("/missing").is_none());
    }

    #[test]
    fn sample_has_items_route() {
        let server = MockSiteServer::sample();
        let state = server.state.lock();
        let items = state.lookup("/data/items.json").expect("route");
        let parsed = crate::items::parse_items(&items.body, "mock").expect("items");
        assert_eq!(parsed.len(), 4);
    }
}
