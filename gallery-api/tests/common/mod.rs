//! Shared helpers for gallery integration tests
//!
//! - sample item lists
//! - an in-memory [`ItemSource`] that counts loads
//! - a client wired to the mock site server
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use gallery::mock::{MockSiteHandle, MockSiteServer};
use gallery::prelude::*;

/// 2 movies and 3 other items, in file order
pub fn mixed_items() -> Vec<Item> {
    vec![
        Item::new("m1").with_type(ItemType::Movie).with_title("First movie"),
        Item::new("p1").with_type(ItemType::Picture),
        Item::new("m2").with_type(ItemType::Movie).with_title("Second movie"),
        Item::new("w1")
            .with_type(ItemType::Write)
            .with_summary("Plain summary"),
        Item::new("d1").with_type(ItemType::Dev),
    ]
}

/// Item with a markdown body at `/content/{id}.md`
pub fn article(id: &str) -> Item {
    Item::new(id).with_type(ItemType::Write).with_assets(Assets {
        md: Some(format!("/content/{id}.md")),
        ..Default::default()
    })
}

#[derive(Debug, Default)]
struct MemoryState {
    items: Vec<Item>,
    texts: HashMap<String, (String, Duration)>,
    thumbnails: HashMap<String, (String, Duration)>,
    fail_items: Option<String>,
    item_loads: AtomicUsize,
    text_loads: AtomicUsize,
    lookups_started: AtomicUsize,
    lookups_finished: AtomicUsize,
}

/// In-memory item source. Clones share state and counters.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    state: Arc<MemoryState>,
}

impl MemorySource {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            state: Arc::new(MemoryState {
                items,
                ..Default::default()
            }),
        }
    }

    /// A source whose item load always fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            state: Arc::new(MemoryState {
                fail_items: Some(message.to_string()),
                ..Default::default()
            }),
        }
    }

    /// Adds a text asset served after `delay`. Call before cloning.
    #[must_use]
    pub fn with_text(mut self, path: &str, text: &str, delay: Duration) -> Self {
        let state = Arc::get_mut(&mut self.state).expect("with_text before clone");
        state
            .texts
            .insert(path.to_string(), (text.to_string(), delay));
        self
    }

    /// Answers thumbnail lookups for `track_url` after `delay`. Call before cloning.
    #[must_use]
    pub fn with_thumbnail(mut self, track_url: &str, thumbnail: &str, delay: Duration) -> Self {
        let state = Arc::get_mut(&mut self.state).expect("with_thumbnail before clone");
        state
            .thumbnails
            .insert(track_url.to_string(), (thumbnail.to_string(), delay));
        self
    }

    pub fn lookups_started(&self) -> usize {
        self.state.lookups_started.load(Ordering::SeqCst)
    }

    pub fn lookups_finished(&self) -> usize {
        self.state.lookups_finished.load(Ordering::SeqCst)
    }

    pub fn item_loads(&self) -> usize {
        self.state.item_loads.load(Ordering::SeqCst)
    }

    pub fn text_loads(&self) -> usize {
        self.state.text_loads.load(Ordering::SeqCst)
    }
}

impl ItemSource for MemorySource {
    async fn load_items(&self) -> Result<Vec<Item>, GalleryError> {
        self.state.item_loads.fetch_add(1, Ordering::SeqCst);
        match &self.state.fail_items {
            Some(message) => Err(GalleryError::Other {
                message: message.clone(),
            }),
            None => Ok(self.state.items.clone()),
        }
    }

    async fn load_text(&self, path: &str) -> Result<String, GalleryError> {
        self.state.text_loads.fetch_add(1, Ordering::SeqCst);
        let Some((text, delay)) = self.state.texts.get(path).cloned() else {
            return Err(GalleryError::NotFound {
                obj_type: "text".to_string(),
                key: path.to_string(),
            });
        };
        tokio::time::sleep(delay).await;
        Ok(text)
    }

    async fn lookup_thumbnail(&self, track_url: &str) -> Result<Option<String>, GalleryError> {
        self.state.lookups_started.fetch_add(1, Ordering::SeqCst);
        let Some((thumbnail, delay)) = self.state.thumbnails.get(track_url).cloned() else {
            self.state.lookups_finished.fetch_add(1, Ordering::SeqCst);
            return Ok(None);
        };
        tokio::time::sleep(delay).await;
        self.state.lookups_finished.fetch_add(1, Ordering::SeqCst);
        Ok(Some(thumbnail))
    }
}

/// Starts `server` on an ephemeral local port.
pub async fn start_mock(server: MockSiteServer) -> MockSiteHandle {
    let addr: SocketAddr = "127.0.0.1:0".parse().expect("addr");
    server.start(addr).await.expect("start mock site")
}

/// Client pointed at the mock site, including the YouTube and oEmbed endpoints.
pub fn mock_client(handle: &MockSiteHandle) -> GalleryClient {
    let base = handle.url();
    let config = ClientConfig::default()
        .base_url(&base)
        .youtube_thumbnail_base(&format!("{base}/vi"))
        .soundcloud_oembed_url(&format!("{base}/oembed"))
        .timeout(Duration::from_secs(5));
    GalleryClient::with_config(config).expect("client")
}

/// Temp project directory with `items` in `data/items.json`
pub fn temp_project(items: &[Item]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("data")).expect("mkdir");
    let body = serde_json::to_string_pretty(items).expect("json");
    std::fs::write(dir.path().join("data/items.json"), body).expect("write");
    dir
}
