//! # Detail panel
//!
//! Hover panel showing one item's details.
//!
//! - entering a card or row cancels any pending hide and shows that item
//! - leaving a card or row, or the panel, starts the hide timer (200 ms)
//! - entering the panel cancels the timer; a timer that fires while the
//!   pointer is over the panel leaves it shown
//!
//! [`PanelState`] is the synchronous state machine. [`DetailPanel`] drives it
//! with a single owned tokio timer task and loads markdown summaries in the
//! background. A summary is applied only if the panel still shows the item
//! it was loaded for.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

use crate::{
    Result,
    config::{HIDE_PANEL_DELAY, PREVIEW_MAX_CHARS, PREVIEW_MAX_LINES},
    items::Item,
    source::ItemSource,
};

/// Summary region of the panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum SummaryText {
    /// Region hidden
    Hidden,
    /// Markdown preview is being loaded from this path
    Loading(String),
    /// Visible text
    Text(String),
}

impl SummaryText {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Panel contents for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailContent {
    pub item_id: String,
    /// `title || id`
    pub title: String,
    /// Type, or empty
    pub item_type: String,
    pub summary: SummaryText,
    /// Hidden when `None`
    pub date: Option<String>,
    /// Hidden when empty
    pub tags: Vec<String>,
}

impl DetailContent {
    pub fn for_item(item: &Item) -> Self {
        let summary = match (item.markdown_path(), item.summary()) {
            (Some(path), _) => SummaryText::Loading(path.to_string()),
            (None, Some(summary)) => SummaryText::Text(summary.to_string()),
            (None, None) => SummaryText::Hidden,
        };
        Self {
            item_id: item.id.clone(),
            title: item.display_title().to_string(),
            item_type: item.type_str().unwrap_or_default().to_string(),
            summary,
            date: item.date().map(ToString::to_string),
            tags: item.tags.clone(),
        }
    }
}

/// Short preview of a markdown body: the first three non-empty lines that are
/// not headings, joined with spaces, cut to 200 characters, followed by `...`.
pub fn markdown_preview(markdown: &str) -> String {
    let joined = markdown
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .take(PREVIEW_MAX_LINES)
        .collect::<Vec<_>>()
        .join(" ");
    let mut preview: String = joined.chars().take(PREVIEW_MAX_CHARS).collect();
    preview.push_str("...");
    preview
}

/// Panel state machine, without timers
#[derive(Debug, Default, Clone)]
pub struct PanelState {
    content: Option<DetailContent>,
    shown: bool,
    pointer_over_panel: bool,
    hide_pending: bool,
}

impl PanelState {
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Content of the last shown item
    pub fn content(&self) -> Option<&DetailContent> {
        self.content.as_ref()
    }

    pub fn is_hide_pending(&self) -> bool {
        self.hide_pending
    }

    /// Pointer entered a card or row.
    pub fn show(&mut self, item: &Item) -> &DetailContent {
        self.hide_pending = false;
        self.shown = true;
        self.content.insert(DetailContent::for_item(item))
    }

    /// Pointer left a card or row: a hide is pending.
    pub fn arm_hide(&mut self) {
        self.hide_pending = true;
    }

    pub fn cancel_hide(&mut self) {
        self.hide_pending = false;
    }

    /// Pointer entered the panel.
    pub fn enter_panel(&mut self) {
        self.pointer_over_panel = true;
        self.hide_pending = false;
    }

    /// Pointer left the panel.
    pub fn leave_panel(&mut self) {
        self.pointer_over_panel = false;
        self.hide_pending = true;
    }

    /// The hide timer fired. Returns true if the panel was hidden.
    pub fn hide_timer_fired(&mut self) -> bool {
        if !self.hide_pending {
            return false;
        }
        self.hide_pending = false;
        if self.pointer_over_panel {
            return false;
        }
        self.shown = false;
        true
    }

    /// Applies a loaded summary for `item_id`. Ignored unless the panel still
    /// shows that item. A failed load hides the summary region.
    pub fn apply_summary(&mut self, item_id: &str, loaded: Result<String>) -> bool {
        match self.content.as_mut() {
            Some(content) if self.shown && content.item_id == item_id => {
                content.summary = match loaded {
                    Ok(markdown) => SummaryText::Text(markdown_preview(&markdown)),
                    Err(err) => {
                        debug!(item = item_id, error = %err, "Markdown summary fetch failed");
                        SummaryText::Hidden
                    }
                };
                true
            }
            _ => false,
        }
    }
}

/// Detail panel with an owned hide timer.
///
/// Dropping the panel aborts the timer and any summary loads.
#[derive(Debug)]
pub struct DetailPanel {
    state: Arc<Mutex<PanelState>>,
    delay: Duration,
    hide_timer: Option<JoinHandle<()>>,
    summary_tasks: Vec<AbortHandle>,
}

impl Default for DetailPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl DetailPanel {
    pub fn new() -> Self {
        Self::with_delay(HIDE_PANEL_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(PanelState::default())),
            delay,
            hide_timer: None,
            summary_tasks: Vec::new(),
        }
    }

    pub fn is_shown(&self) -> bool {
        self.state.lock().is_shown()
    }

    /// Snapshot of the current content
    pub fn content(&self) -> Option<DetailContent> {
        self.state.lock().content().cloned()
    }

    /// Snapshot of the full state
    pub fn state(&self) -> PanelState {
        self.state.lock().clone()
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.hide_timer.take() {
            timer.abort();
        }
    }

    fn start_timer(&mut self) {
        self.cancel_timer();
        let state = self.state.clone();
        let delay = self.delay;
        self.hide_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if state.lock().hide_timer_fired() {
                debug!("detail panel hidden");
            }
        }));
    }

    /// Pointer entered a card or row for `item`. Markdown summaries are loaded
    /// from `source` in the background; the returned handle completes when
    /// the summary has been applied or discarded.
    pub fn hover<S>(&mut self, item: &Item, source: &S) -> Option<JoinHandle<()>>
    where
        S: ItemSource + Clone + 'static,
    {
        self.cancel_timer();
        let summary = self.state.lock().show(item).summary.clone();
        let SummaryText::Loading(path) = summary else {
            return None;
        };
        let state = self.state.clone();
        let source = source.clone();
        let item_id = item.id.clone();
        let handle = tokio::spawn(async move {
            let loaded = source.load_text(&path).await;
            if !state.lock().apply_summary(&item_id, loaded) {
                debug!(item = %item_id, "stale summary discarded");
            }
        });
        self.summary_tasks.retain(|task| !task.is_finished());
        self.summary_tasks.push(handle.abort_handle());
        Some(handle)
    }

    /// Pointer left a card or row.
    pub fn leave(&mut self) {
        self.state.lock().arm_hide();
        self.start_timer();
    }

    /// Pointer entered the panel.
    pub fn enter_panel(&mut self) {
        self.cancel_timer();
        self.state.lock().enter_panel();
    }

    /// Pointer left the panel.
    pub fn leave_panel(&mut self) {
        self.state.lock().leave_panel();
        self.start_timer();
    }

    /// True while a hide timer task is armed and has not fired.
    pub fn timer_armed(&self) -> bool {
        self.hide_timer.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for DetailPanel {
    fn drop(&mut self) {
        self.cancel_timer();
        for task in &self.summary_tasks {
            task.abort();
        }
    }
}
