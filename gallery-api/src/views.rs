//! # Views
//!
//! The view pipeline turns an item list into a [`View`] tree. It is pure: a
//! [`Surface`](crate::render::Surface) decides how the tree is displayed.
//!
//! Pipeline: filter by exact type (when a filter is set), reverse when the
//! sort order is [`SortOrder::Desc`], then produce the empty state or one unit
//! per item. There is no comparator sort; `Asc` is file order.
//!
//! ```rust
//! use gallery::prelude::*;
//! let items = vec![
//!     Item::new("a").with_type(ItemType::Movie),
//!     Item::new("b").with_type(ItemType::Music),
//!     Item::new("c").with_type(ItemType::Movie),
//! ];
//! let options = ViewOptions::default().sort(SortOrder::Desc).filter_type("movie");
//! let ids: Vec<_> = prepare_items(&items, &options).iter().map(|i| i.id.as_str()).collect();
//! assert_eq!(ids, vec!["c", "a"]);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    actions::{ClickAction, resolve_action},
    config::{PREVIEW_MAX_CHARS, YOUTUBE_THUMBNAIL_BASE},
    items::{Item, distinct_types},
    render::Surface,
    resolver::{
        FallbackStep, PlaceholderSize, ThumbnailSource, item_placeholder, thumbnail_source,
    },
    source::ItemSource,
};

/// Message shown for an empty list
pub const EMPTY_MESSAGE: &str = "No data";
/// Message shown while loading
pub const LOADING_MESSAGE: &str = "Loading...";
/// Label of the "no filter" option
pub const ALL_TYPES_LABEL: &str = "All";

/// The three gallery views
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ViewKind {
    #[default]
    Grid,
    Table,
    Simple,
}

impl ViewKind {
    /// True for views with sort/filter controls
    pub fn has_controls(self) -> bool {
        matches!(self, Self::Grid | Self::Table)
    }
}

/// Display order
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    /// File (insertion) order
    #[default]
    Asc,
    /// Reverse file order
    Desc,
}

/// Sort and filter options for a view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOptions {
    pub sort_order: SortOrder,
    /// Exact type to keep; empty means no filter
    pub filter_type: String,
}

impl ViewOptions {
    #[must_use]
    pub fn sort(self, sort_order: SortOrder) -> Self {
        Self { sort_order, ..self }
    }

    #[must_use]
    pub fn filter_type(self, filter_type: impl Into<String>) -> Self {
        Self {
            filter_type: filter_type.into(),
            ..self
        }
    }
}

/// Applies the filter and sort order. Returns references into `items`.
pub fn prepare_items<'a>(items: &'a [Item], options: &ViewOptions) -> Vec<&'a Item> {
    let mut filtered: Vec<&Item> = if options.filter_type.is_empty() {
        items.iter().collect()
    } else {
        items
            .iter()
            .filter(|item| item.item_type.as_deref() == Some(options.filter_type.as_str()))
            .collect()
    };
    if options.sort_order == SortOrder::Desc {
        filtered.reverse();
    }
    filtered
}

/// One entry of the type filter dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

/// Type filter dropdown contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeFilterOptions {
    /// `All` first, then distinct types sorted
    pub options: Vec<FilterOption>,
    /// Selected value; empty for `All`
    pub selected: String,
}

/// Builds the dropdown from the full, unfiltered item list. `current` is kept
/// if it is still one of the types, otherwise the selection resets to `All`.
pub fn type_filter_options(items: &[Item], current: &str) -> TypeFilterOptions {
    let types = distinct_types(items);
    let selected = if types.iter().any(|t| t == current) {
        current.to_string()
    } else {
        String::new()
    };
    let options = std::iter::once(FilterOption {
        value: String::new(),
        label: ALL_TYPES_LABEL.to_string(),
    })
    .chain(types.into_iter().map(|t| FilterOption {
        value: t.clone(),
        label: t,
    }))
    .collect();
    TypeFilterOptions { options, selected }
}

/// Thumbnail image of a card or row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThumbnailImage {
    /// Current image url; the placeholder until something resolves
    pub src: String,
    pub alt: String,
    /// Url to try when `src` fails to load (YouTube `hqdefault`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    /// Placeholder for this item, used after the fallback chain runs out
    pub placeholder: String,
    #[serde(skip)]
    pub source: ThumbnailSource,
}

impl ThumbnailImage {
    fn for_item(item: &Item, size: PlaceholderSize, youtube_base: &str) -> Self {
        let source = thumbnail_source(item);
        let placeholder = item_placeholder(item, size);
        let initial = source.initial_url(youtube_base);
        let fallback = match source.on_error(&initial, youtube_base) {
            FallbackStep::Retry(url) => Some(url),
            FallbackStep::LookupOEmbed(_) | FallbackStep::Placeholder => None,
        };
        Self {
            src: if initial.is_empty() {
                placeholder.clone()
            } else {
                initial
            },
            alt: item.display_title().to_string(),
            fallback,
            placeholder,
            source,
        }
    }

    /// True while the src is the placeholder
    pub fn is_placeholder(&self) -> bool {
        self.src == self.placeholder
    }

    /// SoundCloud track url, while the thumbnail still waits for its lookup
    pub fn pending_lookup(&self) -> Option<&str> {
        match &self.source {
            ThumbnailSource::SoundCloud { url } if self.is_placeholder() => Some(url),
            _ => None,
        }
    }
}

/// Grid card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub id: String,
    /// `data-type` attribute, when the item has a type
    pub data_type: Option<String>,
    pub thumbnail: ThumbnailImage,
    pub action: Option<ClickAction>,
    /// Source item, for the detail panel
    #[serde(skip)]
    pub item: Item,
}

impl Card {
    pub fn new(item: &Item) -> Self {
        Self::with_youtube_base(item, YOUTUBE_THUMBNAIL_BASE)
    }

    /// Card whose YouTube thumbnails come from `youtube_base`
    pub fn with_youtube_base(item: &Item, youtube_base: &str) -> Self {
        Self {
            id: item.id.clone(),
            data_type: item.type_str().map(ToString::to_string),
            thumbnail: ThumbnailImage::for_item(item, PlaceholderSize::Grid, youtube_base),
            action: resolve_action(item),
            item: item.clone(),
        }
    }
}

/// Table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub id: String,
    /// `view-transition-name` style
    pub transition_name: String,
    pub thumbnail: ThumbnailImage,
    pub title: String,
    /// Type, or `-`
    pub type_label: String,
    /// Date, or `-`
    pub date_label: String,
    /// Tags; rendered as `-` when empty
    pub tags: Vec<String>,
    pub action: Option<ClickAction>,
    /// Markdown asset to preview in the tooltip
    pub markdown: Option<String>,
    /// First characters of the markdown, once loaded
    pub tooltip: Option<String>,
    #[serde(skip)]
    pub item: Item,
}

impl Row {
    pub fn new(item: &Item) -> Self {
        Self::with_youtube_base(item, YOUTUBE_THUMBNAIL_BASE)
    }

    /// Row whose YouTube thumbnails come from `youtube_base`
    pub fn with_youtube_base(item: &Item, youtube_base: &str) -> Self {
        Self {
            id: item.id.clone(),
            transition_name: view_transition_name(&item.id),
            thumbnail: ThumbnailImage::for_item(item, PlaceholderSize::Table, youtube_base),
            title: item.display_title().to_string(),
            type_label: item.type_str().unwrap_or("-").to_string(),
            date_label: item.date().unwrap_or("-").to_string(),
            tags: item.tags.clone(),
            action: resolve_action(item),
            markdown: item.markdown_path().map(ToString::to_string),
            tooltip: None,
            item: item.clone(),
        }
    }
}

/// `item-` + id, with anything outside `[a-zA-Z0-9_-]` replaced by `-`.
pub fn view_transition_name(id: &str) -> String {
    let sanitized: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("item-{sanitized}")
}

/// Contents of a view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "units", rename_all = "snake_case")]
pub enum ViewBody {
    Loading,
    /// No items after filtering
    Empty,
    /// Load failure, shown inline
    Error { message: String },
    Grid(Vec<Card>),
    Table(Vec<Row>),
    /// Item ids
    Simple(Vec<String>),
}

/// A rendered view: what a surface displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub kind: ViewKind,
    pub body: ViewBody,
    /// Type filter dropdown (grid and table only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_options: Option<TypeFilterOptions>,
}

impl View {
    pub fn loading(kind: ViewKind) -> Self {
        Self {
            kind,
            body: ViewBody::Loading,
            type_options: None,
        }
    }

    pub fn error(kind: ViewKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            body: ViewBody::Error {
                message: message.into(),
            },
            type_options: None,
        }
    }

    /// Number of visual units (cards, rows or list entries)
    pub fn len(&self) -> usize {
        match &self.body {
            ViewBody::Grid(cards) => cards.len(),
            ViewBody::Table(rows) => rows.len(),
            ViewBody::Simple(ids) => ids.len(),
            ViewBody::Loading | ViewBody::Empty | ViewBody::Error { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids in display order
    pub fn ids(&self) -> Vec<&str> {
        match &self.body {
            ViewBody::Grid(cards) => cards.iter().map(|c| c.id.as_str()).collect(),
            ViewBody::Table(rows) => rows.iter().map(|r| r.id.as_str()).collect(),
            ViewBody::Simple(ids) => ids.iter().map(String::as_str).collect(),
            ViewBody::Loading | ViewBody::Empty | ViewBody::Error { .. } => Vec::new(),
        }
    }

    fn thumbnails_mut(&mut self, id: &str) -> Vec<&mut ThumbnailImage> {
        match &mut self.body {
            ViewBody::Grid(cards) => cards
                .iter_mut()
                .filter(|c| c.id == id)
                .map(|c| &mut c.thumbnail)
                .collect(),
            ViewBody::Table(rows) => rows
                .iter_mut()
                .filter(|r| r.id == id)
                .map(|r| &mut r.thumbnail)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Swaps the thumbnail of unit `id` in place. Returns false if no unit has that id.
    pub fn set_thumbnail(&mut self, id: &str, src: &str) -> bool {
        let thumbs = self.thumbnails_mut(id);
        let found = !thumbs.is_empty();
        for thumb in thumbs {
            thumb.src = src.to_string();
        }
        found
    }

    /// Falls back to the placeholder for unit `id`.
    pub fn reset_thumbnail(&mut self, id: &str) {
        for thumb in self.thumbnails_mut(id) {
            thumb.src.clone_from(&thumb.placeholder);
        }
    }

    /// `(unit id, track url)` for every thumbnail still waiting on a
    /// SoundCloud lookup
    pub fn pending_lookups(&self) -> Vec<(String, String)> {
        let thumbs: Vec<(&str, &ThumbnailImage)> = match &self.body {
            ViewBody::Grid(cards) => cards.iter().map(|c| (c.id.as_str(), &c.thumbnail)).collect(),
            ViewBody::Table(rows) => rows.iter().map(|r| (r.id.as_str(), &r.thumbnail)).collect(),
            _ => return Vec::new(),
        };
        thumbs
            .into_iter()
            .filter_map(|(id, thumb)| {
                thumb
                    .pending_lookup()
                    .map(|url| (id.to_string(), url.to_string()))
            })
            .collect()
    }

    /// Sets the tooltip of table row `id`.
    pub fn set_tooltip(&mut self, id: &str, tooltip: &str) {
        if let ViewBody::Table(rows) = &mut self.body {
            for row in rows.iter_mut().filter(|r| r.id == id) {
                row.tooltip = Some(tooltip.to_string());
            }
        }
    }

    /// Source items of the displayed cards or rows, in display order
    pub fn items(&self) -> Vec<&Item> {
        match &self.body {
            ViewBody::Grid(cards) => cards.iter().map(|c| &c.item).collect(),
            ViewBody::Table(rows) => rows.iter().map(|r| &r.item).collect(),
            _ => Vec::new(),
        }
    }
}

/// Builds a view from an item list.
pub fn build_view(kind: ViewKind, items: &[Item], options: &ViewOptions) -> View {
    build_view_with_base(kind, items, options, YOUTUBE_THUMBNAIL_BASE)
}

/// Builds a view whose YouTube thumbnails come from `youtube_base`.
pub fn build_view_with_base(
    kind: ViewKind,
    items: &[Item],
    options: &ViewOptions,
    youtube_base: &str,
) -> View {
    let prepared = prepare_items(items, options);
    let type_options = kind
        .has_controls()
        .then(|| type_filter_options(items, &options.filter_type));
    let body = if prepared.is_empty() {
        ViewBody::Empty
    } else {
        match kind {
            ViewKind::Grid => ViewBody::Grid(
                prepared
                    .into_iter()
                    .map(|item| Card::with_youtube_base(item, youtube_base))
                    .collect(),
            ),
            ViewKind::Table => ViewBody::Table(
                prepared
                    .into_iter()
                    .map(|item| Row::with_youtube_base(item, youtube_base))
                    .collect(),
            ),
            ViewKind::Simple => {
                ViewBody::Simple(prepared.into_iter().map(|item| item.id.clone()).collect())
            }
        }
    };
    View {
        kind,
        body,
        type_options,
    }
}

/// Renders a view onto `surface`.
///
/// The surface shows the loading state first. When `items` is `None` the
/// list is loaded from `source`; load and parse failures are rendered inline
/// and never returned. On success the item list used for rendering is
/// returned so callers can cache it.
pub async fn render_view<S, F>(
    surface: &mut F,
    kind: ViewKind,
    options: &ViewOptions,
    items: Option<Vec<Item>>,
    source: &S,
) -> (View, Option<Vec<Item>>)
where
    S: ItemSource,
    F: Surface + ?Sized,
{
    surface.mount(&View::loading(kind));
    let items = match items {
        Some(items) => items,
        None => match source.load_items().await {
            Ok(items) => items,
            Err(err) => {
                debug!(%kind, error = %err, "render failed");
                let view = View::error(kind, err.to_string());
                surface.mount(&view);
                return (view, None);
            }
        },
    };
    let view = build_view_with_base(kind, &items, options, source.youtube_thumbnail_base());
    debug!(%kind, units = view.len(), "rendered");
    surface.mount(&view);
    (view, Some(items))
}

/// Loads markdown tooltips for table rows. Rows whose markdown cannot be
/// loaded keep no tooltip.
pub async fn load_tooltips<S: ItemSource>(view: &mut View, source: &S) {
    let pending: Vec<(String, String)> = match &view.body {
        ViewBody::Table(rows) => rows
            .iter()
            .filter_map(|r| r.markdown.clone().map(|md| (r.id.clone(), md)))
            .collect(),
        _ => return,
    };
    for (id, path) in pending {
        match source.load_text(&path).await {
            Ok(text) => view.set_tooltip(&id, &tooltip_preview(&text)),
            Err(err) => debug!(%id, %path, error = %err, "markdown tooltip failed"),
        }
    }
}

/// First characters of a markdown body, unmodified.
pub fn tooltip_preview(markdown: &str) -> String {
    markdown.chars().take(PREVIEW_MAX_CHARS).collect()
}
