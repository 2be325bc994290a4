//! # Thumbnail resolution
//!
//! Picks a displayable thumbnail for an item. First match wins:
//!
//! 1. `assets.image`
//! 2. `thumbnail`
//! 3. derived from `url`: YouTube links map to the `maxresdefault` CDN image,
//!    SoundCloud links need an oEmbed lookup (see [`crate::oembed`])
//! 4. nothing: the caller shows a placeholder
//!
//! ```rust
//! use gallery::prelude::*;
//! let item = Item::new("v").with_url("https://www.youtube.com/watch?v=abc123");
//! assert_eq!(
//!     resolve_thumbnail_url(&item),
//!     "https://img.youtube.com/vi/abc123/maxresdefault.jpg"
//! );
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::{config::YOUTUBE_THUMBNAIL_BASE, items::Item};

static YOUTUBE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)")
        .expect("valid youtube id regex")
});
static YOUTUBE_QUERY_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"youtube\.com/watch\?.*v=([^&\n?#]+)").expect("valid youtube query regex")
});

/// Extracts a YouTube video id from a watch, short or embed url.
pub fn extract_video_id(url: &str) -> Option<&str> {
    [&*YOUTUBE_ID_RE, &*YOUTUBE_QUERY_ID_RE]
        .into_iter()
        .find_map(|re| re.captures(url).and_then(|caps| caps.get(1)))
        .map(|m| m.as_str())
}

pub(crate) fn is_youtube_url(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

pub(crate) fn is_soundcloud_url(url: &str) -> bool {
    url.contains("soundcloud.com")
}

/// YouTube CDN image quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
pub enum YouTubeQuality {
    #[strum(serialize = "maxresdefault")]
    MaxRes,
    #[strum(serialize = "hqdefault")]
    High,
}

/// CDN url for a video id. `base` is normally `https://img.youtube.com/vi`.
pub fn youtube_thumbnail_url(base: &str, video_id: &str, quality: YouTubeQuality) -> String {
    format!("{}/{video_id}/{quality}.jpg", base.trim_end_matches('/'))
}

/// Where an item's thumbnail comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailSource {
    /// `assets.image`
    AssetImage(String),
    /// `thumbnail`
    Explicit(String),
    /// YouTube video; CDN image derived from the id
    YouTube { video_id: String },
    /// SoundCloud track; thumbnail needs an oEmbed lookup
    SoundCloud { url: String },
    /// Nothing usable
    Placeholder,
}

impl ThumbnailSource {
    /// Url shown on first render. Empty for sources that start as a placeholder.
    pub fn initial_url(&self, youtube_base: &str) -> String {
        match self {
            Self::AssetImage(url) | Self::Explicit(url) => url.clone(),
            Self::YouTube { video_id } => {
                youtube_thumbnail_url(youtube_base, video_id, YouTubeQuality::MaxRes)
            }
            Self::SoundCloud { .. } | Self::Placeholder => String::new(),
        }
    }

    /// Next step after the image at `failed_src` could not be loaded.
    pub fn on_error(&self, failed_src: &str, youtube_base: &str) -> FallbackStep {
        match self {
            Self::YouTube { video_id } => {
                let hq = youtube_thumbnail_url(youtube_base, video_id, YouTubeQuality::High);
                if failed_src == hq {
                    FallbackStep::Placeholder
                } else {
                    FallbackStep::Retry(hq)
                }
            }
            Self::SoundCloud { url } => FallbackStep::LookupOEmbed(url.clone()),
            _ => FallbackStep::Placeholder,
        }
    }

    /// True if the thumbnail is resolved asynchronously.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::SoundCloud { .. })
    }
}

/// What to show after an image load failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackStep {
    /// Try another url
    Retry(String),
    /// Retry the SoundCloud oEmbed lookup for this track url
    LookupOEmbed(String),
    /// Give up and show the placeholder
    Placeholder,
}

/// Classifies an item's thumbnail source.
pub fn thumbnail_source(item: &Item) -> ThumbnailSource {
    if let Some(image) = item.asset_image() {
        return ThumbnailSource::AssetImage(image.to_string());
    }
    if let Some(thumbnail) = item.thumbnail() {
        return ThumbnailSource::Explicit(thumbnail.to_string());
    }
    match item.url() {
        Some(url) if is_youtube_url(url) => match extract_video_id(url) {
            Some(id) => ThumbnailSource::YouTube {
                video_id: id.to_string(),
            },
            None => ThumbnailSource::Placeholder,
        },
        Some(url) if is_soundcloud_url(url) => ThumbnailSource::SoundCloud {
            url: url.to_string(),
        },
        _ => ThumbnailSource::Placeholder,
    }
}

/// Thumbnail url for first render, or an empty string when the placeholder
/// should be shown.
pub fn resolve_thumbnail_url(item: &Item) -> String {
    thumbnail_source(item).initial_url(YOUTUBE_THUMBNAIL_BASE)
}

/// Placeholder dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderSize {
    /// 400x225, for grid cards
    Grid,
    /// 80x45, for table rows
    Table,
}

impl PlaceholderSize {
    fn dimensions(self) -> (u32, u32, u32) {
        match self {
            Self::Grid => (400, 225, 14),
            Self::Table => (80, 45, 10),
        }
    }
}

/// `data:` uri of a grey SVG labelled with `label`.
pub fn placeholder_data_uri(label: &str, size: PlaceholderSize) -> String {
    let (width, height, font_size) = size.dimensions();
    let svg = format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">"#,
            r##"<rect fill="#f0f0f0" width="{w}" height="{h}"/>"##,
            r##"<text fill="#999" font-family="sans-serif" font-size="{fs}" dy="10.5" font-weight="bold" x="50%" y="50%" text-anchor="middle">{label}</text>"##,
            "</svg>"
        ),
        w = width,
        h = height,
        fs = font_size,
        label = crate::render::escape_html(label),
    );
    format!("data:image/svg+xml,{}", urlencoding::encode(&svg))
}

/// Placeholder for an item: labelled with its type, or its id.
pub fn item_placeholder(item: &Item, size: PlaceholderSize) -> String {
    placeholder_data_uri(item.placeholder_label(), size)
}
