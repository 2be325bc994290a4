//! # App shell
//!
//! Wires the views together: view switching, persisted preferences, per-view
//! sort/filter controls, re-rendering from the cached item list, transition
//! timing, image-size styling and the detail panel.
//!
//! Cards and rows with a SoundCloud url are mounted with their placeholder.
//! Their oEmbed lookups run in the background while the rest of the view
//! loads, and each thumbnail found is swapped in and the view remounted.
//! Every render replaces the pending lookups, aborting the previous ones.
//!
//! All state lives in [`GalleryApp`]; there are no globals.
//!
//! ```rust,no_run
//! use gallery::prelude::*;
//! # async fn example() -> Result<(), GalleryError> {
//! let source = DirSource::new("./site");
//! let mut app = GalleryApp::new(source, Box::new(MemoryPreferences::new()), |_| HtmlSurface::default());
//! let plan = app.start().await;
//! println!("{} units, cleanup after {:?}", plan.stagger.len(), plan.cleanup);
//! app.set_grid_controls(ViewOptions::default().sort(SortOrder::Desc)).await;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    detail::DetailPanel,
    items::Item,
    oembed::{CardLookups, PendingThumbnail},
    prefs::{PreferenceStore, UiPreferences},
    render::{Surface, image_size_style},
    source::ItemSource,
    views::{
        TypeFilterOptions, View, ViewKind, ViewOptions, build_view_with_base, load_tooltips,
        render_view,
        type_filter_options,
    },
};

/// Transition timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShellTiming {
    /// Longest exit animation of the previous view
    pub exit_animation: Duration,
    /// Enter animation duration before the per-item stagger
    pub enter_base: Duration,
    /// Delay between consecutive items
    pub stagger: Duration,
    /// Time after the last item starts before classes are cleaned up
    pub enter_tail: Duration,
}

impl Default for ShellTiming {
    fn default() -> Self {
        Self {
            exit_animation: Duration::from_millis(250),
            enter_base: Duration::from_millis(250),
            stagger: Duration::from_millis(30),
            enter_tail: Duration::from_millis(450),
        }
    }
}

impl ShellTiming {
    /// Enter animation for `count` items: per-item delays and the cleanup time
    /// (`base + count * stagger + tail`).
    pub fn enter_plan(&self, count: usize) -> (Vec<Duration>, Duration) {
        let count32 = u32::try_from(count).unwrap_or(u32::MAX);
        let stagger = (0..count32).map(|i| self.stagger * i).collect();
        let cleanup = self.enter_base + self.stagger.saturating_mul(count32) + self.enter_tail;
        (stagger, cleanup)
    }
}

/// Animation plan for one view switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionPlan {
    /// View that was visible before the switch
    pub from: Option<ViewKind>,
    pub to: ViewKind,
    /// Exit animation of the previous view, if a different view was visible
    pub exit: Option<Duration>,
    /// Animation delay per unit, in display order
    pub stagger: Vec<Duration>,
    /// When enter animation classes are removed
    pub cleanup: Duration,
}

/// Visibility of the header control groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeaderControls {
    pub grid_visible: bool,
    pub table_visible: bool,
}

impl HeaderControls {
    pub fn for_view(view: ViewKind) -> Self {
        Self {
            grid_visible: view == ViewKind::Grid,
            table_visible: view == ViewKind::Table,
        }
    }
}

/// One surface per view
#[derive(Debug)]
struct Surfaces<F> {
    grid: F,
    table: F,
    simple: F,
}

impl<F> Surfaces<F> {
    fn get(&self, kind: ViewKind) -> &F {
        match kind {
            ViewKind::Grid => &self.grid,
            ViewKind::Table => &self.table,
            ViewKind::Simple => &self.simple,
        }
    }

    fn get_mut(&mut self, kind: ViewKind) -> &mut F {
        match kind {
            ViewKind::Grid => &mut self.grid,
            ViewKind::Table => &mut self.table,
            ViewKind::Simple => &mut self.simple,
        }
    }
}

/// The gallery application shell
pub struct GalleryApp<S, F> {
    source: S,
    prefs: Box<dyn PreferenceStore>,
    surfaces: Surfaces<F>,
    timing: ShellTiming,
    current_view: ViewKind,
    visible: Option<ViewKind>,
    items: Vec<Item>,
    grid_controls: ViewOptions,
    table_controls: ViewOptions,
    type_options: Option<TypeFilterOptions>,
    header: HeaderControls,
    image_size: u32,
    detail: DetailPanel,
    lookups: CardLookups,
}

impl<S, F> std::fmt::Debug for GalleryApp<S, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryApp")
            .field("current_view", &self.current_view)
            .field("visible", &self.visible)
            .field("items", &self.items.len())
            .field("image_size", &self.image_size)
            .field("lookups", &self.lookups.len())
            .finish_non_exhaustive()
    }
}

impl<S, F> GalleryApp<S, F>
where
    S: ItemSource + Clone + 'static,
    F: Surface,
{
    /// Creates the shell. `make_surface` is called once per view. The current
    /// view and image size are read from `prefs`.
    pub fn new(
        source: S,
        prefs: Box<dyn PreferenceStore>,
        mut make_surface: impl FnMut(ViewKind) -> F,
    ) -> Self {
        let ui = UiPreferences::load(prefs.as_ref());
        Self {
            source,
            prefs,
            surfaces: Surfaces {
                grid: make_surface(ViewKind::Grid),
                table: make_surface(ViewKind::Table),
                simple: make_surface(ViewKind::Simple),
            },
            timing: ShellTiming::default(),
            current_view: ui.current_view,
            visible: None,
            items: Vec::new(),
            grid_controls: ViewOptions::default(),
            table_controls: ViewOptions::default(),
            type_options: None,
            header: HeaderControls::default(),
            image_size: ui.image_size,
            detail: DetailPanel::new(),
            lookups: CardLookups::new(),
        }
    }

    #[must_use]
    pub fn with_timing(self, timing: ShellTiming) -> Self {
        Self { timing, ..self }
    }

    #[must_use]
    pub fn with_detail_panel(self, detail: DetailPanel) -> Self {
        Self { detail, ..self }
    }

    /// Renders the stored current view.
    pub async fn start(&mut self) -> TransitionPlan {
        let view = self.current_view;
        self.render(view).await
    }

    /// Switches to `view`, persisting the choice.
    pub async fn switch_view(&mut self, view: ViewKind) -> TransitionPlan {
        if let Err(err) = UiPreferences::save_view(self.prefs.as_ref(), view) {
            warn!(error = %err, "could not save current view");
        }
        self.current_view = view;
        self.render(view).await
    }

    async fn render(&mut self, view: ViewKind) -> TransitionPlan {
        let from = self.visible;
        let exit = match from {
            Some(prev) if prev != view => {
                self.surfaces.get_mut(prev).set_visible(false);
                Some(self.timing.exit_animation)
            }
            _ => {
                for kind in [ViewKind::Grid, ViewKind::Table, ViewKind::Simple] {
                    self.surfaces.get_mut(kind).set_visible(false);
                }
                None
            }
        };

        self.header = HeaderControls::for_view(view);
        self.surfaces.get_mut(view).set_visible(true);

        let options = match view {
            ViewKind::Grid => self.grid_controls.clone(),
            ViewKind::Table => self.table_controls.clone(),
            ViewKind::Simple => ViewOptions::default(),
        };
        self.lookups = CardLookups::new();
        let surface = self.surfaces.get_mut(view);
        let (mut rendered, loaded) = render_view(surface, view, &options, None, &self.source).await;
        self.visible = Some(view);

        if view.has_controls()
            && let Some(items) = loaded
        {
            self.update_type_filter(&items);
            self.items = items;
            self.start_lookups(&rendered);
            if view == ViewKind::Table {
                self.mount_tooltips(&mut rendered).await;
            }
            self.swap_thumbnails(view, &mut rendered).await;
        }

        let (stagger, cleanup) = self.timing.enter_plan(rendered.len());
        debug!(%view, units = rendered.len(), ?cleanup, "view switched");
        TransitionPlan {
            from,
            to: view,
            exit,
            stagger,
            cleanup,
        }
    }

    // Repopulates both type filters, keeping each selection if still present.
    fn update_type_filter(&mut self, items: &[Item]) {
        let grid = type_filter_options(items, &self.grid_controls.filter_type);
        let table = type_filter_options(items, &self.table_controls.filter_type);
        self.grid_controls.filter_type.clone_from(&grid.selected);
        self.table_controls.filter_type.clone_from(&table.selected);
        self.type_options = Some(if self.current_view == ViewKind::Table {
            table
        } else {
            grid
        });
    }

    // Replaces the pending lookups with one per unit still showing a
    // SoundCloud placeholder.
    fn start_lookups(&mut self, view: &View) {
        let mut lookups = CardLookups::new();
        for (id, track_url) in view.pending_lookups() {
            let source = self.source.clone();
            lookups.insert(PendingThumbnail::spawn(id, async move {
                source.lookup_thumbnail(&track_url).await
            }));
        }
        self.lookups = lookups;
    }

    // Applies lookups as they finish, remounting after each thumbnail found.
    async fn swap_thumbnails(&mut self, kind: ViewKind, view: &mut View) {
        while let Some((id, found)) = self.lookups.next_finished().await {
            match found {
                Some(url) if view.set_thumbnail(&id, &url) => {
                    debug!(%id, "thumbnail swapped");
                    self.surfaces.get_mut(kind).mount(view);
                }
                _ => debug!(%id, "keeping placeholder"),
            }
        }
    }

    /// Number of thumbnail lookups still running
    pub fn pending_lookups(&self) -> usize {
        self.lookups.len()
    }

    async fn mount_tooltips(&mut self, view: &mut View) {
        load_tooltips(view, &self.source).await;
        self.surfaces.get_mut(ViewKind::Table).mount(view);
    }

    /// Updates the grid controls. Re-renders from the cached items, without
    /// refetching, when the grid is the current view.
    pub async fn set_grid_controls(&mut self, options: ViewOptions) -> Option<View> {
        self.grid_controls = options;
        self.rerender(ViewKind::Grid).await
    }

    /// Updates the table controls. Re-renders from the cached items, without
    /// refetching, when the table is the current view.
    pub async fn set_table_controls(&mut self, options: ViewOptions) -> Option<View> {
        self.table_controls = options;
        self.rerender(ViewKind::Table).await
    }

    async fn rerender(&mut self, view: ViewKind) -> Option<View> {
        if self.current_view != view || self.items.is_empty() {
            return None;
        }
        let options = if view == ViewKind::Grid {
            &self.grid_controls
        } else {
            &self.table_controls
        };
        let mut rendered = build_view_with_base(
            view,
            &self.items,
            options,
            self.source.youtube_thumbnail_base(),
        );
        self.surfaces.get_mut(view).mount(&rendered);
        self.start_lookups(&rendered);
        if view == ViewKind::Table {
            self.mount_tooltips(&mut rendered).await;
        }
        self.swap_thumbnails(view, &mut rendered).await;
        Some(rendered)
    }

    /// Sets and persists the image size.
    pub fn set_image_size(&mut self, image_size: u32) {
        self.image_size = image_size;
        if let Err(err) = UiPreferences::save_image_size(self.prefs.as_ref(), image_size) {
            warn!(error = %err, "could not save image size");
        }
    }

    pub fn image_size(&self) -> u32 {
        self.image_size
    }

    /// Grid container style: `--image-size` and the column template
    pub fn image_style(&self) -> String {
        image_size_style(self.image_size)
    }

    pub fn current_view(&self) -> ViewKind {
        self.current_view
    }

    /// View whose surface is visible
    pub fn visible_view(&self) -> Option<ViewKind> {
        self.visible
    }

    /// Items from the last grid or table load
    pub fn cached_items(&self) -> &[Item] {
        &self.items
    }

    pub fn header(&self) -> HeaderControls {
        self.header
    }

    pub fn type_options(&self) -> Option<&TypeFilterOptions> {
        self.type_options.as_ref()
    }

    pub fn grid_controls(&self) -> &ViewOptions {
        &self.grid_controls
    }

    pub fn table_controls(&self) -> &ViewOptions {
        &self.table_controls
    }

    pub fn surface(&self, view: ViewKind) -> &F {
        self.surfaces.get(view)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn detail_panel(&self) -> &DetailPanel {
        &self.detail
    }

    pub fn detail_panel_mut(&mut self) -> &mut DetailPanel {
        &mut self.detail
    }

    pub fn timing(&self) -> &ShellTiming {
        &self.timing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_plan_timing() {
        let timing = ShellTiming::default();
        let (stagger, cleanup) = timing.enter_plan(3);
        assert_eq!(
            stagger,
            vec![
                Duration::ZERO,
                Duration::from_millis(30),
                Duration::from_millis(60)
            ]
        );
        assert_eq!(cleanup, Duration::from_millis(250 + 90 + 450));
        let (none, cleanup) = timing.enter_plan(0);
        assert!(none.is_empty());
        assert_eq!(cleanup, Duration::from_millis(700));
    }

    #[test]
    fn header_controls_per_view() {
        assert_eq!(
            HeaderControls::for_view(ViewKind::Grid),
            HeaderControls {
                grid_visible: true,
                table_visible: false
            }
        );
        assert_eq!(
            HeaderControls::for_view(ViewKind::Simple),
            HeaderControls::default()
        );
    }
}
