//! # Admin save flow
//!
//! An [`ItemDraft`] holds the add-item form. [`AdminSession::save`] turns it
//! into an [`Item`], asks a [`DirectoryPicker`] for the project root and writes
//! the item, its thumbnail and its markdown body into a [`ProjectStore`].
//!
//! Status moves `Idle → Saving → Success | Error | Cancelled`. After a success
//! the session returns to `Idle` and clears the form once the reset delay
//! (2 s) has passed.
//!
//! ```rust,no_run
//! use gallery::prelude::*;
//! # async fn example() -> Result<(), GalleryError> {
//! let mut session = AdminSession::new();
//! session.edit(|draft| {
//!     draft.id = "sunset".into();
//!     draft.item_type = Some(ItemType::Picture);
//!     draft.assets.image = Some("/thumbnails/sunset.jpg".into());
//!     draft.add_tag("photo");
//! });
//! let status = session.save(&FixedDirectory::new("./site")).await;
//! println!("{status}");
//! # Ok(())
//! # }
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;
use serde::Serialize;
use snafu::prelude::*;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    Result,
    config::{NEW_ITEM_ID, SAVE_RESET_DELAY, THUMBNAILS_DIR, UNTAGGED},
    error::{GalleryError, IoSnafu},
    items::{Assets, Item, ItemType},
    store::ProjectStore,
    validation::ValidationLimits,
};

/// Save status shown to the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Success {
        id: String,
        /// Entries in `items.json` after the save
        count: usize,
    },
    Error {
        message: String,
    },
    /// No directory was chosen. Informational, not an error.
    Cancelled,
}

impl SaveStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => Ok(()),
            Self::Saving => write!(f, "Saving..."),
            Self::Success { id, count } => write!(f, "Saved {id} ({count} items)"),
            Self::Error { message } => write!(f, "Error: {message}"),
            Self::Cancelled => write!(f, "Save cancelled"),
        }
    }
}

/// Type-specific asset inputs. Only the fields for the chosen type are saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFields {
    /// picture
    pub image: Option<String>,
    /// movie
    pub video: Option<String>,
    /// music
    pub audio: Option<String>,
    /// write: markdown path, such as `/content/article.md`
    pub content: Option<String>,
    /// write: markdown body saved into `content/`
    pub markdown: Option<String>,
    /// dev
    pub repo: Option<String>,
    /// dev
    pub demo: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

impl AssetFields {
    /// Assets for `item_type`; empty inputs are omitted.
    pub fn to_assets(&self, item_type: Option<ItemType>) -> Assets {
        let mut assets = Assets::default();
        match item_type {
            Some(ItemType::Picture) => assets.image = non_empty(self.image.as_ref()),
            Some(ItemType::Movie) => assets.video = non_empty(self.video.as_ref()),
            Some(ItemType::Music) => assets.audio = non_empty(self.audio.as_ref()),
            Some(ItemType::Write) => assets.content = non_empty(self.content.as_ref()),
            Some(ItemType::Dev) => {
                assets.repo = non_empty(self.repo.as_ref());
                assets.demo = non_empty(self.demo.as_ref());
            }
            Some(ItemType::Software | ItemType::Hardware) | None => {}
        }
        assets
    }

    /// Markdown body to write, for write items with a non-empty body
    pub fn markdown_body(&self, item_type: Option<ItemType>) -> Option<&str> {
        (item_type == Some(ItemType::Write))
            .then_some(self.markdown.as_deref())
            .flatten()
            .filter(|body| !body.is_empty())
    }
}

/// A thumbnail file chosen in the form
#[derive(Clone, PartialEq, Eq)]
pub struct ThumbnailUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ThumbnailUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThumbnailUpload")
            .field("file_name", &self.file_name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl ThumbnailUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Reads a local file.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.context(IoSnafu {
            action: "read",
            path,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }

    /// Text after the last `.` of the file name (the whole name if there is none)
    pub fn extension(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map_or(self.file_name.as_str(), |(_, ext)| ext)
    }
}

/// Site path of an uploaded thumbnail: `/thumbnails/{id}.{ext}`
pub fn thumbnail_site_path(id: &str, ext: &str) -> String {
    let id = if id.is_empty() { NEW_ITEM_ID } else { id };
    format!("/{THUMBNAILS_DIR}/{id}.{ext}")
}

/// The add-item form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub id: String,
    pub item_type: Option<ItemType>,
    pub title: String,
    pub summary: String,
    /// `YYYY-MM-DD`, defaults to today
    pub date: String,
    /// Thumbnail url or site path
    pub thumbnail: String,
    pub assets: AssetFields,
    tags: Vec<String>,
    upload: Option<ThumbnailUpload>,
    // thumbnail path was derived from the upload, not typed
    thumbnail_from_upload: bool,
}

impl Default for ItemDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// Today's date as `YYYY-MM-DD` (UTC)
pub fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

impl ItemDraft {
    pub fn new() -> Self {
        Self {
            id: String::new(),
            item_type: None,
            title: String::new(),
            summary: String::new(),
            date: today(),
            thumbnail: String::new(),
            assets: AssetFields::default(),
            tags: Vec::new(),
            upload: None,
            thumbnail_from_upload: false,
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Adds a tag. The input is trimmed; empty and duplicate tags are ignored.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// Chooses a thumbnail file and points the thumbnail path at
    /// `/thumbnails/{id or new-item}.{ext}`.
    pub fn set_thumbnail_file(&mut self, upload: ThumbnailUpload) {
        self.thumbnail = thumbnail_site_path(&self.id, upload.extension());
        self.thumbnail_from_upload = true;
        self.upload = Some(upload);
    }

    /// Sets a typed thumbnail path or url.
    pub fn set_thumbnail_path(&mut self, thumbnail: impl Into<String>) {
        self.thumbnail = thumbnail.into();
        self.thumbnail_from_upload = false;
    }

    pub fn upload(&self) -> Option<&ThumbnailUpload> {
        self.upload.as_ref()
    }

    /// Assembles the item. Empty fields are omitted; no tags become `["untagged"]`.
    pub fn to_item(&self) -> Item {
        let text = |value: &str| (!value.trim().is_empty()).then(|| value.to_string());
        let thumbnail = match (&self.upload, self.thumbnail_from_upload) {
            (Some(upload), true) => Some(thumbnail_site_path(&self.id, upload.extension())),
            _ => text(&self.thumbnail),
        };
        let assets = self.assets.to_assets(self.item_type);
        let mut item = Item::new(self.id.trim());
        item.item_type = self.item_type.map(|t| t.to_string());
        item.title = text(&self.title);
        item.summary = text(&self.summary);
        item.date = text(&self.date);
        item.tags = if self.tags.is_empty() {
            vec![UNTAGGED.to_string()]
        } else {
            self.tags.clone()
        };
        item.thumbnail = thumbnail;
        item.assets = (!assets.is_empty()).then_some(assets);
        item
    }

    /// Clears the form: tags emptied, date back to today.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Asks the user for a project root. `Ok(None)` means the user cancelled.
pub trait DirectoryPicker: Send + Sync {
    fn pick_directory(&self) -> impl Future<Output = Result<Option<PathBuf>>> + Send;
}

/// Picker with a preset answer
#[derive(Debug, Clone, Default)]
pub struct FixedDirectory(Option<PathBuf>);

impl FixedDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self(Some(dir.into()))
    }

    /// Picker that always cancels
    pub fn cancelled() -> Self {
        Self(None)
    }
}

impl DirectoryPicker for FixedDirectory {
    async fn pick_directory(&self) -> Result<Option<PathBuf>> {
        Ok(self.0.clone())
    }
}

/// Admin form session with save status
#[derive(Debug)]
pub struct AdminSession {
    draft: Arc<Mutex<ItemDraft>>,
    status: Arc<Mutex<SaveStatus>>,
    limits: ValidationLimits,
    reset_delay: Duration,
    reset_task: Option<JoinHandle<()>>,
}

impl Default for AdminSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminSession {
    pub fn new() -> Self {
        Self {
            draft: Arc::new(Mutex::new(ItemDraft::new())),
            status: Arc::new(Mutex::new(SaveStatus::Idle)),
            limits: ValidationLimits::default(),
            reset_delay: SAVE_RESET_DELAY,
            reset_task: None,
        }
    }

    #[must_use]
    pub fn limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn reset_delay(mut self, reset_delay: Duration) -> Self {
        self.reset_delay = reset_delay;
        self
    }

    pub fn status(&self) -> SaveStatus {
        self.status.lock().clone()
    }

    /// Copy of the form
    pub fn draft(&self) -> ItemDraft {
        self.draft.lock().clone()
    }

    /// Edits the form.
    pub fn edit<R>(&self, f: impl FnOnce(&mut ItemDraft) -> R) -> R {
        f(&mut self.draft.lock())
    }

    fn set_status(&self, status: SaveStatus) -> SaveStatus {
        self.status.lock().clone_from(&status);
        status
    }

    fn cancel_reset(&mut self) {
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
    }

    /// Saves the form into the directory chosen by `picker`.
    ///
    /// Failures become an error status; cancelling the picker becomes
    /// [`SaveStatus::Cancelled`]. Saving twice appends twice.
    pub async fn save<P: DirectoryPicker>(&mut self, picker: &P) -> SaveStatus {
        self.cancel_reset();
        self.set_status(SaveStatus::Saving);
        let draft = self.draft();
        match self.write(&draft, picker).await {
            Ok(count) => {
                let status = self.set_status(SaveStatus::Success {
                    id: draft.to_item().id,
                    count,
                });
                self.schedule_reset();
                status
            }
            Err(GalleryError::Cancelled) => {
                info!("save cancelled");
                self.set_status(SaveStatus::Cancelled)
            }
            Err(err) => {
                warn!(error = %err, "save failed");
                self.set_status(SaveStatus::Error {
                    message: err.to_string(),
                })
            }
        }
    }

    async fn write<P: DirectoryPicker>(&self, draft: &ItemDraft, picker: &P) -> Result<usize> {
        let item = draft.to_item();
        self.limits.validate_item(&item)?;
        let markdown = draft.assets.markdown_body(draft.item_type);
        if let Some(body) = markdown {
            self.limits.validate_markdown(body, &format!("item {}", item.id))?;
        }
        if let Some(upload) = draft.upload() {
            self.limits
                .validate_thumbnail(upload.bytes.len(), &format!("item {}", item.id))?;
        }

        let root = picker.pick_directory().await?.context(crate::error::CancelledSnafu)?;
        debug!(root = %root.display(), id = %item.id, "saving item");
        let store = ProjectStore::new(root);
        store.ensure_layout().await;
        let count = store.append_item(&item).await?;

        if let Some(upload) = draft.upload() {
            store
                .write_thumbnail(&item.id, upload.extension(), &upload.bytes)
                .await?;
        }
        if let Some(body) = markdown {
            let content_path = item.assets.as_ref().and_then(|a| a.content.as_deref());
            store.write_markdown(content_path, &item.id, body).await?;
        }
        Ok(count)
    }

    fn schedule_reset(&mut self) {
        let status = self.status.clone();
        let draft = self.draft.clone();
        let delay = self.reset_delay;
        self.reset_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            draft.lock().reset();
            *status.lock() = SaveStatus::Idle;
        }));
    }
}

impl Drop for AdminSession {
    fn drop(&mut self) {
        self.cancel_reset();
    }
}
