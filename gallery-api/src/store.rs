//! # Project store
//!
//! The on-disk layout of a gallery project:
//!
//! ```text
//! {root}/data/items.json
//! {root}/thumbnails/{id}.{ext}
//! {root}/content/{name}.md
//! ```
//!
//! Existing entries of `items.json` are kept as raw json values so that a
//! save never rewrites or drops entries this version cannot parse.

use std::path::{Path, PathBuf};

use serde_json::Value;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    Result,
    config::{CONTENT_DIR, DATA_DIR, ITEMS_FILE, THUMBNAILS_DIR},
    error::{IoSnafu, SerializationSnafu},
    items::Item,
};

/// A gallery project directory
#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn thumbnails_dir(&self) -> PathBuf {
        self.root.join(THUMBNAILS_DIR)
    }

    pub fn content_dir(&self) -> PathBuf {
        self.root.join(CONTENT_DIR)
    }

    pub fn items_path(&self) -> PathBuf {
        self.data_dir().join(ITEMS_FILE)
    }

    /// Creates `data/`, `thumbnails/` and `content/`. Failures are logged and
    /// otherwise ignored; a later write reports the real problem.
    pub async fn ensure_layout(&self) {
        for dir in [self.data_dir(), self.thumbnails_dir(), self.content_dir()] {
            if let Err(err) = tokio::fs::create_dir_all(&dir).await {
                warn!(dir = %dir.display(), error = %err, "could not create directory");
            }
        }
    }

    /// Reads the existing entries. A missing or blank file is an empty list.
    /// Any other read failure, or unparseable content (invalid utf-8, bad
    /// json, json that is not an array), is logged and treated as an empty
    /// list.
    pub async fn read_entries(&self) -> Vec<Value> {
        let path = self.items_path();
        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read existing items; starting empty");
                return Vec::new();
            }
        };
        if content.trim_ascii().is_empty() {
            return Vec::new();
        }
        match serde_json::from_slice::<Value>(&content) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                warn!(path = %path.display(), "existing items are not an array; starting empty");
                Vec::new()
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not parse existing items; starting empty");
                Vec::new()
            }
        }
    }

    /// Writes the entries as pretty-printed json (2-space indent) with a
    /// trailing newline.
    pub async fn write_entries(&self, entries: &[Value]) -> Result<()> {
        let path = self.items_path();
        let mut data = serde_json::to_string_pretty(entries).context(SerializationSnafu)?;
        data.push('\n');
        tokio::fs::write(&path, data).await.context(IoSnafu {
            action: "write",
            path: &path,
        })
    }

    /// Appends one item to `items.json`. Returns the new entry count.
    pub async fn append_item(&self, item: &Item) -> Result<usize> {
        let mut entries = self.read_entries().await;
        entries.push(serde_json::to_value(item).context(SerializationSnafu)?);
        self.write_entries(&entries).await?;
        info!(id = %item.id, count = entries.len(), "item saved");
        Ok(entries.len())
    }

    /// Writes an uploaded thumbnail to `thumbnails/{id}.{ext}`.
    pub async fn write_thumbnail(&self, id: &str, ext: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.thumbnails_dir().join(format!("{id}.{ext}"));
        tokio::fs::write(&path, bytes).await.context(IoSnafu {
            action: "write",
            path: &path,
        })?;
        debug!(path = %path.display(), len = bytes.len(), "thumbnail written");
        Ok(path)
    }

    /// Writes a markdown body into `content/`. The file name is the last
    /// segment of `content_path`, or `{id}.md` when there is no usable path.
    pub async fn write_markdown(
        &self,
        content_path: Option<&str>,
        id: &str,
        body: &str,
    ) -> Result<PathBuf> {
        let file_name = markdown_file_name(content_path, id);
        let path = self.content_dir().join(file_name);
        tokio::fs::write(&path, body).await.context(IoSnafu {
            action: "write",
            path: &path,
        })?;
        debug!(path = %path.display(), "markdown written");
        Ok(path)
    }
}

/// File name for a markdown body: last path segment, or `{id}.md`.
pub fn markdown_file_name(content_path: Option<&str>, id: &str) -> String {
    content_path
        .and_then(|path| path.rsplit(['/', '\\']).next())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map_or_else(|| format!("{id}.md"), ToString::to_string)
}
