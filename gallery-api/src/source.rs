//! # Item sources
//!
//! Where views load items and markdown from: a static site over HTTP
//! ([`GalleryClient`](crate::client::GalleryClient)) or a local project
//! directory ([`DirSource`]).

use std::{
    future::Future,
    path::{Path, PathBuf},
};

use snafu::prelude::*;
use tracing::debug;

use crate::{
    Result,
    config::{DATA_DIR, ITEMS_FILE, YOUTUBE_THUMBNAIL_BASE},
    error::IoSnafu,
    items::{Item, parse_items},
};

/// Loads the item list and text assets
pub trait ItemSource: Send + Sync {
    /// Loads and parses the item list.
    fn load_items(&self) -> impl Future<Output = Result<Vec<Item>>> + Send;

    /// Loads a text asset, such as a markdown file referenced by an item.
    fn load_text(&self, path: &str) -> impl Future<Output = Result<String>> + Send;

    /// Looks up the thumbnail of a SoundCloud track. Sources without network
    /// access find nothing.
    fn lookup_thumbnail(
        &self,
        track_url: &str,
    ) -> impl Future<Output = Result<Option<String>>> + Send {
        let _ = track_url;
        async { Ok(None) }
    }

    /// Base url of the YouTube thumbnail CDN
    fn youtube_thumbnail_base(&self) -> &str {
        YOUTUBE_THUMBNAIL_BASE
    }
}

impl<T: ItemSource> ItemSource for &T {
    fn load_items(&self) -> impl Future<Output = Result<Vec<Item>>> + Send {
        (**self).load_items()
    }

    fn load_text(&self, path: &str) -> impl Future<Output = Result<String>> + Send {
        (**self).load_text(path)
    }

    fn lookup_thumbnail(
        &self,
        track_url: &str,
    ) -> impl Future<Output = Result<Option<String>>> + Send {
        (**self).lookup_thumbnail(track_url)
    }

    fn youtube_thumbnail_base(&self) -> &str {
        (**self).youtube_thumbnail_base()
    }
}

/// Reads items from a project directory laid out like the site:
/// `data/items.json`, `content/*.md`.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the item list
    pub fn items_path(&self) -> PathBuf {
        self.root.join(DATA_DIR).join(ITEMS_FILE)
    }

    /// Resolves a site path (`/content/a.md` or `content/a.md`) inside the root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl ItemSource for DirSource {
    async fn load_items(&self) -> Result<Vec<Item>> {
        let path = self.items_path();
        debug!(path = %path.display(), "load items");
        let body = tokio::fs::read(&path).await.context(IoSnafu {
            action: "read",
            path: &path,
        })?;
        parse_items(&body, &path.display().to_string())
    }

    async fn load_text(&self, path: &str) -> Result<String> {
        let path = self.resolve(path);
        tokio::fs::read_to_string(&path).await.context(IoSnafu {
            action: "read",
            path: &path,
        })
    }
}
