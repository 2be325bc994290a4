/*
 * Media gallery library
 *
 * SPDX-FileCopyrightText: 2025-2026 Steve Schoettler
 * SPDX-License-Identifier: Apache-2.0
 */
//! # Media Gallery
//!
//! Items, thumbnail resolution, view rendering and the admin store for a
//! static-site media gallery.
//!
//! ## Features
//!
//! - item model for `data/items.json`, preserving unknown fields
//! - thumbnail resolution with YouTube and SoundCloud heuristics
//! - click-action resolution for the viewer pages
//! - pure view pipeline (grid, table, simple) producing a view-model tree
//! - HTML surface adapter
//! - hover detail panel with an owned hide timer
//! - app shell with view switching and persisted UI preferences
//! - admin save flow writing `items.json`, thumbnails and markdown
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gallery::prelude::*;
//! # async fn example() -> Result<(), GalleryError> {
//!
//! // Load items from a static site
//! let client = GalleryClient::with_config(ClientConfig::default().base_url("http://localhost:8080"))?;
//! let items = client.fetch_items().await?;
//!
//! // Build a grid of movies, newest first
//! let options = ViewOptions::default().sort(SortOrder::Desc).filter_type("movie");
//! let view = build_view(ViewKind::Grid, &items, &options);
//!
//! // Bind it to an html surface
//! let mut surface = HtmlSurface::default();
//! surface.mount(&view);
//! println!("{}", surface.html());
//! # Ok(())
//! # }
//! ```
//!
//! ## Layout
//!
//! - [`items`]: `Item`, `Assets`, `ItemType`
//! - [`resolver`]: thumbnail precedence and YouTube id extraction
//! - [`actions`]: click-action priority
//! - [`views`]: filter/sort pipeline and view-model tree
//! - [`render`]: `Surface` trait and `HtmlSurface`
//! - [`detail`]: hover detail panel
//! - [`shell`]: view switching, preferences, transitions
//! - [`admin`] and [`store`]: saving new items into a project directory
//!
#![allow(clippy::missing_errors_doc)] // pedantic
#![allow(clippy::missing_const_for_fn)] //  nursery function
#![allow(clippy::must_use_candidate)] // pedantic
#![warn(clippy::default_trait_access)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::implicit_clone)]
#![warn(clippy::match_same_arms)]
#![warn(clippy::needless_raw_strings)]
#![warn(clippy::option_if_let_else)]
#![warn(clippy::redundant_clone)]
#![warn(clippy::redundant_closure)]
#![warn(clippy::uninlined_format_args)]
#![warn(clippy::unused_async)]

pub mod actions;
pub mod admin;
pub mod client;
pub mod detail;
pub mod error;
mod http_client;
pub mod items;
#[doc(hidden)]
pub mod mock;
pub mod oembed;
pub mod prefs;
pub mod render;
pub mod resolver;
pub mod shell;
pub mod source;
pub mod store;
pub mod validation;
pub mod views;

/// Result type alias using `GalleryError` as the default error.
pub type Result<T, E = crate::error::GalleryError> = std::result::Result<T, E>;

/// Prelude module - import the common types with `use gallery::prelude::*;`
pub mod prelude {
    pub use super::{DEFAULT_ITEMS_PATH, DEFAULT_SITE_URL};
    pub use crate::error::*;
    pub use crate::{
        // Click actions
        actions::{ClickAction, ViewerPage, resolve_action},
        // Admin save flow
        admin::{
            AdminSession, AssetFields, DirectoryPicker, FixedDirectory, ItemDraft, SaveStatus,
            ThumbnailUpload,
        },
        // HTTP client
        client::{ClientConfig, GalleryClient},
        // Detail panel
        detail::{DetailContent, DetailPanel, PanelState, SummaryText, markdown_preview},
        // HTTP metrics
        http_client::HttpMetricsSnapshot,
        // Items
        items::{Assets, Item, ItemType},
        // SoundCloud lookups
        oembed::{OEmbedResponse, PendingThumbnail},
        // Preferences
        prefs::{FilePreferences, MemoryPreferences, PreferenceStore, UiPreferences},
        // Surfaces
        render::{HtmlSurface, RecordingSurface, Surface},
        // Thumbnails
        resolver::{
            PlaceholderSize, ThumbnailSource, extract_video_id, placeholder_data_uri,
            resolve_thumbnail_url, thumbnail_source,
        },
        // App shell
        shell::{GalleryApp, HeaderControls, ShellTiming, TransitionPlan},
        // Item sources
        source::{DirSource, ItemSource},
        // Project store
        store::ProjectStore,
        // Validation
        validation::ValidationLimits,
        // Views
        views::{
            Card, Row, SortOrder, ThumbnailImage, TypeFilterOptions, View, ViewBody, ViewKind,
            ViewOptions, build_view, build_view_with_base, prepare_items, type_filter_options,
        },
    };
}

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default static site url
pub const DEFAULT_SITE_URL: &str = "http://127.0.0.1:8080";

/// Location of the item list, relative to the site or project root
pub const DEFAULT_ITEMS_PATH: &str = "data/items.json";

pub(crate) mod config {
    use std::time::Duration;

    /// Environment variable for default site url
    pub const GALLERY_URL_ENV: &str = "GALLERY_URL";

    /// YouTube thumbnail CDN
    pub const YOUTUBE_THUMBNAIL_BASE: &str = "https://img.youtube.com/vi";

    /// SoundCloud oEmbed endpoint
    pub const SOUNDCLOUD_OEMBED_URL: &str = "https://soundcloud.com/oembed";

    /// Default http request timeout
    pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

    /// Project subdirectories
    pub const DATA_DIR: &str = "data";
    pub const THUMBNAILS_DIR: &str = "thumbnails";
    pub const CONTENT_DIR: &str = "content";
    pub const ITEMS_FILE: &str = "items.json";

    /// Tag saved when the form has no tags
    pub const UNTAGGED: &str = "untagged";

    /// Id used for thumbnail paths before an id is entered
    pub const NEW_ITEM_ID: &str = "new-item";

    /// Detail panel hide delay
    pub const HIDE_PANEL_DELAY: Duration = Duration::from_millis(200);

    /// Admin status auto-reset delay
    pub const SAVE_RESET_DELAY: Duration = Duration::from_secs(2);

    /// Markdown preview length (detail panel and table tooltips)
    pub const PREVIEW_MAX_CHARS: usize = 200;

    /// Markdown preview line count (detail panel)
    pub const PREVIEW_MAX_LINES: usize = 3;

    // Validation limits
    pub const VALIDATION_ID_MAX_LEN: u64 = 200;
    pub const VALIDATION_TITLE_MAX_LEN: u64 = 4096;
    pub const VALIDATION_TAG_MAX_COUNT: u64 = 256;
    pub const VALIDATION_TAG_MAX_LEN: u64 = 256;
    pub const VALIDATION_MARKDOWN_MAX_LEN: u64 = 10 * 1024 * 1024;
    pub const VALIDATION_THUMBNAIL_MAX_LEN: u64 = 50 * 1024 * 1024;
}
