//! # Gallery items
//!
//! One entry of `data/items.json`. Items are read-only once loaded; new items
//! are appended by the admin flow (see [`crate::admin`]).
//!
//! Unknown fields on items and assets are kept in `extra` so that a load/save
//! cycle never drops data written by other tools.
//!
//! ```rust
//! use gallery::prelude::*;
//! let item = Item::new("clip-1")
//!     .with_type(ItemType::Movie)
//!     .with_url("https://youtu.be/abc123");
//! assert_eq!(item.display_title(), "clip-1");
//! assert_eq!(item.kind(), Some(ItemType::Movie));
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use snafu::prelude::*;

use crate::{Result, error::NotAnArraySnafu, http_client::deserialize_json};

/// Known item types. Files may contain other strings; see [`Item::item_type`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemType {
    Picture,
    Movie,
    Music,
    Write,
    Dev,
    Software,
    Hardware,
}

/// Type-specific asset payload
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Assets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    /// Markdown path written by the admin form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Markdown path read by the viewers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wav: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Assets {
    /// Returns true if no known or unknown asset is set.
    pub fn is_empty(&self) -> bool {
        self.extra.is_empty()
            && [
                &self.image,
                &self.video,
                &self.audio,
                &self.content,
                &self.md,
                &self.repo,
                &self.demo,
                &self.description,
                &self.midi,
                &self.wav,
            ]
            .iter()
            .all(|field| field.is_none())
    }

    pub fn image(&self) -> Option<&str> {
        present(self.image.as_ref())
    }

    pub fn wav(&self) -> Option<&str> {
        present(self.wav.as_ref())
    }

    pub fn midi(&self) -> Option<&str> {
        present(self.midi.as_ref())
    }

    /// Markdown path: `md`, falling back to `content`.
    pub fn markdown(&self) -> Option<&str> {
        present(self.md.as_ref()).or_else(|| present(self.content.as_ref()))
    }
}

/// One gallery entry.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Item {
    /// Unique id (uniqueness is assumed, not enforced)
    pub id: String,

    /// Item type. Kept as a string so files with unknown types still load.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// ISO date (`YYYY-MM-DD`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Tags, in display order
    #[serde(
        default,
        deserialize_with = "deserialize_vec_or_null",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,

    /// Direct thumbnail url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    /// External source url (YouTube, SoundCloud, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<Assets>,

    /// Fields this version doesn't know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn deserialize_vec_or_null<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Vec<String>>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|val| !val.is_empty())
}

impl Item {
    /// Creates an item with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_type: None,
            title: None,
            summary: None,
            date: None,
            tags: Vec::new(),
            thumbnail: None,
            url: None,
            assets: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_type(mut self, item_type: ItemType) -> Self {
        self.item_type = Some(item_type.to_string());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    #[must_use]
    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_assets(mut self, assets: Assets) -> Self {
        self.assets = Some(assets);
        self
    }

    /// Title for display: the title if set and non-empty, otherwise the id.
    pub fn display_title(&self) -> &str {
        present(self.title.as_ref()).unwrap_or(&self.id)
    }

    /// Type string, if set and non-empty.
    pub fn type_str(&self) -> Option<&str> {
        present(self.item_type.as_ref())
    }

    /// Known item type, if the type string is one of [`ItemType`].
    pub fn kind(&self) -> Option<ItemType> {
        self.type_str().and_then(|val| val.parse().ok())
    }

    /// Label drawn on placeholder thumbnails: the type, or the id.
    pub fn placeholder_label(&self) -> &str {
        self.type_str().unwrap_or(&self.id)
    }

    pub fn summary(&self) -> Option<&str> {
        present(self.summary.as_ref())
    }

    pub fn date(&self) -> Option<&str> {
        present(self.date.as_ref())
    }

    pub fn thumbnail(&self) -> Option<&str> {
        present(self.thumbnail.as_ref())
    }

    pub fn url(&self) -> Option<&str> {
        present(self.url.as_ref())
    }

    /// Uploaded image asset
    pub fn asset_image(&self) -> Option<&str> {
        self.assets.as_ref().and_then(Assets::image)
    }

    /// Markdown asset path (`assets.md`, falling back to `assets.content`)
    pub fn markdown_path(&self) -> Option<&str> {
        self.assets.as_ref().and_then(Assets::markdown)
    }
}

/// Parses an item list. `location` is used in error messages.
///
/// The payload must be a json array; anything else is [`GalleryError::NotAnArray`](crate::error::GalleryError::NotAnArray).
pub fn parse_items(body: &[u8], location: &str) -> Result<Vec<Item>> {
    let value: Value = deserialize_json(body)?;
    ensure!(value.is_array(), NotAnArraySnafu { location });
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        tracing::error!("item deserialization failed at {path}: {err}");
        crate::error::GalleryError::Deserialization {
            path,
            source: err.into_inner(),
        }
    })
}

/// Distinct non-empty type strings, sorted.
pub fn distinct_types(items: &[Item]) -> Vec<String> {
    let mut types: Vec<String> = items
        .iter()
        .filter_map(Item::type_str)
        .map(ToString::to_string)
        .collect();
    types.sort();
    types.dedup();
    types
}

// ============================================================================
// TESTS
// ============================================================================
