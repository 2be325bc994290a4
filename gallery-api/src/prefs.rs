//! # UI preferences
//!
//! A small key-value store with two keys: `currentView` (`grid`, `table` or
//! `simple`) and `imageSize` (pixel count as a string). Writes are
//! last-write-wins.
//!
//! - [`MemoryPreferences`]: in-process map
//! - [`FilePreferences`]: json object at `{config_dir}/gallery/preferences.json`

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use serde::Serialize;
use snafu::prelude::*;
use tracing::warn;

use crate::{
    Result,
    error::{IoSnafu, SerializationSnafu},
    views::ViewKind,
};

/// Preference key for the current view
pub const CURRENT_VIEW_KEY: &str = "currentView";
/// Preference key for the image size
pub const IMAGE_SIZE_KEY: &str = "imageSize";
/// Image size when none is stored
pub const DEFAULT_IMAGE_SIZE: u32 = 200;

/// String key-value store for UI preferences
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory preferences
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences persisted as a json object
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FilePreferences {
    /// Default location: `{config_dir}/gallery/preferences.json`
    pub fn default_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("gallery").join("preferences.json")
    }

    /// Opens the default preferences file.
    pub fn open_default() -> Self {
        Self::open(Self::default_path())
    }

    /// Opens a preferences file. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(data) if data.trim().is_empty() => BTreeMap::new(),
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "ignoring invalid preferences");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable preferences");
                BTreeMap::new()
            }
        };
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context(IoSnafu {
                action: "create",
                path: parent,
            })?;
        }
        let data = serde_json::to_string_pretty(values).context(SerializationSnafu)?;
        std::fs::write(&self.path, data).context(IoSnafu {
            action: "write",
            path: &self.path,
        })
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }
}

/// Typed view of the stored preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiPreferences {
    pub current_view: ViewKind,
    /// Image size in pixels
    pub image_size: u32,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            current_view: ViewKind::Grid,
            image_size: DEFAULT_IMAGE_SIZE,
        }
    }
}

impl UiPreferences {
    /// Reads preferences. Missing or unrecognized values fall back to the defaults.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let defaults = Self::default();
        let current_view = store
            .get(CURRENT_VIEW_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.current_view);
        let image_size = store
            .get(IMAGE_SIZE_KEY)
            .and_then(|v| parse_image_size(&v))
            .unwrap_or(defaults.image_size);
        Self {
            current_view,
            image_size,
        }
    }

    pub fn save_view(store: &dyn PreferenceStore, view: ViewKind) -> Result<()> {
        store.set(CURRENT_VIEW_KEY, view.as_ref())
    }

    pub fn save_image_size(store: &dyn PreferenceStore, image_size: u32) -> Result<()> {
        store.set(IMAGE_SIZE_KEY, &image_size.to_string())
    }
}

/// Parses a stored pixel size: `"240"` or `"240px"`. Zero is rejected.
pub fn parse_image_size(value: &str) -> Option<u32> {
    value
        .trim()
        .trim_end_matches("px")
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
}
