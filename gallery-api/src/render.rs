//! # Surfaces
//!
//! A [`Surface`] displays a [`View`]. Each mount replaces the previous content.
//!
//! - [`HtmlSurface`] produces the markup used by the static site.
//! - [`RecordingSurface`] keeps every mounted view, for tests and tooling.

use std::fmt::Write as _;

use crate::{
    actions::ClickAction,
    views::{Card, Row, ThumbnailImage, TypeFilterOptions, View, ViewBody, ViewKind},
};

/// Something that can display a view
pub trait Surface {
    /// Replaces the surface content with `view`.
    fn mount(&mut self, view: &View);

    /// Shows or hides the surface.
    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn mount(&mut self, view: &View) {
        (**self).mount(view);
    }

    fn set_visible(&mut self, visible: bool) {
        (**self).set_visible(visible);
    }

    fn is_visible(&self) -> bool {
        (**self).is_visible()
    }
}

/// Escapes text for html content and attribute values.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Renders views to an html fragment
#[derive(Debug, Default, Clone)]
pub struct HtmlSurface {
    html: String,
    visible: bool,
    display: &'static str,
}

impl HtmlSurface {
    /// Markup of the last mounted view
    pub fn html(&self) -> &str {
        &self.html
    }

    /// CSS `display` value for the container: `grid` for grid cards, `block` otherwise.
    pub fn display(&self) -> &'static str {
        if self.visible { self.display } else { "none" }
    }
}

impl Surface for HtmlSurface {
    fn mount(&mut self, view: &View) {
        self.display = match (&view.body, view.kind) {
            (ViewBody::Grid(_) | ViewBody::Loading | ViewBody::Empty, ViewKind::Grid) => "grid",
            _ => "block",
        };
        self.visible = true;
        self.html = view_html(view);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Keeps every mounted view
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub mounts: Vec<View>,
    pub visible: bool,
    /// Visibility changes, in order
    pub visibility_log: Vec<bool>,
}

impl RecordingSurface {
    /// The most recent view, if any
    pub fn current(&self) -> Option<&View> {
        self.mounts.last()
    }
}

impl Surface for RecordingSurface {
    fn mount(&mut self, view: &View) {
        self.mounts.push(view.clone());
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.visibility_log.push(visible);
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Html fragment for a view body
pub fn view_html(view: &View) -> String {
    match &view.body {
        ViewBody::Loading => r#"<p class="loading-msg">Loading...</p>"#.to_string(),
        ViewBody::Empty => r#"<p class="empty-msg">No data</p>"#.to_string(),
        ViewBody::Error { message } => format!(
            r#"<p class="error-msg" style="color: #f44336;">Error: {}</p>"#,
            escape_html(message)
        ),
        ViewBody::Grid(cards) => cards.iter().map(card_html).collect::<Vec<_>>().join("\n"),
        ViewBody::Table(rows) => table_html(rows),
        ViewBody::Simple(ids) => {
            let mut html = String::from(r#"<ul class="simple-list">"#);
            for id in ids {
                let _ = write!(html, r#"<li class="simple-item">{}</li>"#, escape_html(id));
            }
            html.push_str("</ul>");
            html
        }
    }
}

fn action_attrs(action: Option<&ClickAction>) -> String {
    action.map_or_else(String::new, |action| {
        format!(
            r#" data-href="{}" data-target="{}""#,
            escape_html(&action.href()),
            action.target()
        )
    })
}

/// Image error handler: try `data-fallback` once, then the placeholder.
const IMG_ONERROR: &str = "if(this.dataset.fallback){this.src=this.dataset.fallback;\
this.removeAttribute('data-fallback')}else{this.onerror=null;this.src=this.dataset.placeholder}";

fn img_html(thumb: &ThumbnailImage, class: Option<&str>) -> String {
    let class = class.map_or_else(String::new, |c| format!(r#" class="{c}""#));
    let mut attrs = String::new();
    if let Some(fallback) = &thumb.fallback {
        let _ = write!(attrs, r#" data-fallback="{}""#, escape_html(fallback));
    }
    if let Some(track) = thumb.pending_lookup() {
        let _ = write!(attrs, r#" data-soundcloud="{}""#, escape_html(track));
    }
    if !thumb.is_placeholder() {
        let _ = write!(
            attrs,
            r#" data-placeholder="{}" onerror="{IMG_ONERROR}""#,
            escape_html(&thumb.placeholder)
        );
    }
    format!(
        r#"<img src="{}" alt="{}"{class}{attrs} loading="lazy">"#,
        escape_html(&thumb.src),
        escape_html(&thumb.alt)
    )
}

fn card_html(card: &Card) -> String {
    let data_type = card
        .data_type
        .as_deref()
        .map_or_else(String::new, |t| format!(r#" data-type="{}""#, escape_html(t)));
    format!(
        r#"<div class="media-card" data-id="{}"{data_type}{}><div class="thumbnail">{}</div></div>"#,
        escape_html(&card.id),
        action_attrs(card.action.as_ref()),
        img_html(&card.thumbnail, None),
    )
}

fn table_html(rows: &[Row]) -> String {
    let mut html = String::from(
        "<table><thead><tr><th>Thumbnail</th><th>Title</th><th>Type</th><th>Date</th><th>Tags</th></tr></thead><tbody>",
    );
    for row in rows {
        let title = row
            .tooltip
            .as_deref()
            .map_or_else(String::new, |t| format!(r#" title="{}""#, escape_html(t)));
        let tags = if row.tags.is_empty() {
            "-".to_string()
        } else {
            row.tags
                .iter()
                .map(|t| format!(r#"<span class="table-tag">{}</span>"#, escape_html(t)))
                .collect::<String>()
        };
        let _ = write!(
            html,
            concat!(
                r#"<tr data-id="{id}" style="view-transition-name: {vt}"{title}{action}>"#,
                r#"<td>{img}</td>"#,
                r#"<td class="table-title">{t}</td>"#,
                r#"<td class="table-type">{ty}</td>"#,
                r#"<td class="table-date">{d}</td>"#,
                r#"<td><div class="table-tags">{tags}</div></td></tr>"#
            ),
            id = escape_html(&row.id),
            vt = row.transition_name,
            title = title,
            action = action_attrs(row.action.as_ref()),
            img = img_html(&row.thumbnail, Some("table-thumbnail")),
            t = escape_html(&row.title),
            ty = escape_html(&row.type_label),
            d = escape_html(&row.date_label),
            tags = tags,
        );
    }
    html.push_str("</tbody></table>");
    html
}

/// `<select>` for the type filter
pub fn type_filter_html(options: &TypeFilterOptions, class: &str) -> String {
    let mut html = format!(r#"<select class="{}">"#, escape_html(class));
    for opt in &options.options {
        let selected = if opt.value == options.selected {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            html,
            r#"<option value="{}"{selected}>{}</option>"#,
            escape_html(&opt.value),
            escape_html(&opt.label)
        );
    }
    html.push_str("</select>");
    html
}

/// Inline style for a grid container with the given image size
pub fn image_size_style(image_size: u32) -> String {
    format!(
        "--image-size: {image_size}px; grid-template-columns: repeat(auto-fill, minmax({image_size}px, 1fr));"
    )
}

/// Standalone html document wrapping a rendered view.
pub fn html_page(title: &str, view: &View, image_size: u32) -> String {
    let container_class = match view.kind {
        ViewKind::Grid => "grid-view",
        ViewKind::Table => "table-view",
        ViewKind::Simple => "simple-view",
    };
    let style = if view.kind == ViewKind::Grid {
        format!(r#" style="{}""#, image_size_style(image_size))
    } else {
        String::new()
    };
    let filter = view
        .type_options
        .as_ref()
        .map(|opts| type_filter_html(opts, "type-filter"))
        .unwrap_or_default();
    format!(
        concat!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n",
            "<body>\n<header>{filter}</header>\n<div class=\"{class}\"{style}>\n{body}\n</div>\n</body>\n</html>\n"
        ),
        title = escape_html(title),
        filter = filter,
        class = container_class,
        style = style,
        body = view_html(view),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        items::{Assets, Item, ItemType},
        views::{ViewOptions, build_view},
    };

    #[test]
    fn escape() {
        assert_eq!(escape_html(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn empty_and_error_markup() {
        let mut surface = HtmlSurface::default();
        surface.mount(&build_view(ViewKind::Table, &[], &ViewOptions::default()));
        assert_eq!(surface.html(), r#"<p class="empty-msg">No data</p>"#);
        surface.mount(&View::error(ViewKind::Grid, "Failed <x>"));
        assert!(surface.html().contains("Error: Failed &lt;x&gt;"));
        assert_eq!(surface.display(), "block");
    }

    #[test]
    fn grid_markup() {
        let items = vec![
            Item::new("a")
                .with_type(ItemType::Picture)
                .with_title("A & B")
                .with_assets(Assets {
                    image: Some("/thumbnails/a.png".into()),
                    wav: Some("a.wav".into()),
                    ..Default::default()
                }),
        ];
        let mut surface = HtmlSurface::default();
        surface.mount(&build_view(ViewKind::Grid, &items, &ViewOptions::default()));
        let html = surface.html();
        assert!(html.contains(r#"data-type="picture""#));
        assert!(html.contains(r#"src="/thumbnails/a.png""#));
        assert!(html.contains(r#"alt="A &amp; B""#));
        assert!(html.contains(r#"loading="lazy""#));
        assert!(html.contains(r#"data-href="audioplayer.html?file=a.wav""#));
        assert!(html.contains(r#"data-target="_blank""#));
        assert_eq!(surface.display(), "grid");
    }

    #[test]
    fn youtube_image_carries_fallback_chain() {
        let items = vec![
            Item::new("v")
                .with_type(ItemType::Movie)
                .with_url("https://www.youtube.com/watch?v=abc123"),
        ];
        let view = build_view(ViewKind::Grid, &items, &ViewOptions::default());
        let mut surface = HtmlSurface::default();
        surface.mount(&view);
        let html = surface.html();
        assert!(
            html.contains(r#"src="https://img.youtube.com/vi/abc123/maxresdefault.jpg""#),
            "{html}"
        );
        assert!(
            html.contains(r#"data-fallback="https://img.youtube.com/vi/abc123/hqdefault.jpg""#),
            "{html}"
        );
        assert!(html.contains(r#"data-placeholder="data:image/svg+xml,"#), "{html}");
        assert!(html.contains("onerror=\"if(this.dataset.fallback)"), "{html}");
    }

    #[test]
    fn soundcloud_image_starts_as_placeholder() {
        let items = vec![Item::new("s").with_url("https://soundcloud.com/a/b")];
        let mut view = build_view(ViewKind::Grid, &items, &ViewOptions::default());
        let mut surface = HtmlSurface::default();
        surface.mount(&view);
        let html = surface.html().to_string();
        assert!(html.contains(r#"src="data:image/svg+xml,"#), "{html}");
        assert!(html.contains(r#"data-soundcloud="https://soundcloud.com/a/b""#), "{html}");
        assert!(!html.contains("onerror"), "{html}");

        view.set_thumbnail("s", "https://i1.sndcdn.com/x.jpg");
        surface.mount(&view);
        let html = surface.html();
        assert!(html.contains(r#"src="https://i1.sndcdn.com/x.jpg""#), "{html}");
        assert!(!html.contains("data-soundcloud"), "{html}");
        assert!(html.contains("data-placeholder="), "{html}");
    }

    #[test]
    fn table_markup() {
        let items = vec![Item::new("r 1").with_tags(["x", "y"]), Item::new("r2")];
        let mut view = build_view(ViewKind::Table, &items, &ViewOptions::default());
        view.set_tooltip("r2", "preview");
        let mut surface = HtmlSurface::default();
        surface.mount(&view);
        let html = surface.html();
        assert!(html.starts_with("<table><thead><tr><th>Thumbnail</th><th>Title</th>"));
        assert!(html.contains(r#"style="view-transition-name: item-r-1""#));
        assert!(html.contains(r#"<span class="table-tag">x</span><span class="table-tag">y</span>"#));
        assert!(html.contains(r#"<div class="table-tags">-</div>"#));
        assert!(html.contains(r#"title="preview""#));
        assert!(html.contains(r#"class="table-thumbnail""#));
    }

    #[test]
    fn simple_markup() {
        let items = vec![Item::new("one"), Item::new("two")];
        let mut surface = HtmlSurface::default();
        surface.mount(&build_view(ViewKind::Simple, &items, &ViewOptions::default()));
        assert_eq!(
            surface.html(),
            r#"<ul class="simple-list"><li class="simple-item">one</li><li class="simple-item">two</li></ul>"#
        );
    }

    #[test]
    fn select_markup() {
        let items = vec![Item::new("a").with_type(ItemType::Dev)];
        let opts = crate::views::type_filter_options(&items, "dev");
        let html = type_filter_html(&opts, "type-filter");
        assert_eq!(
            html,
            r#"<select class="type-filter"><option value="">All</option><option value="dev" selected>dev</option></select>"#
        );
    }

    #[test]
    fn page_has_image_size() {
        let view = build_view(ViewKind::Grid, &[Item::new("a")], &ViewOptions::default());
        let page = html_page("Gallery", &view, 240);
        assert!(page.contains("--image-size: 240px"));
        assert!(page.contains("minmax(240px, 1fr)"));
    }

    #[test]
    fn recording_surface_keeps_history() {
        let mut surface = RecordingSurface::default();
        surface.mount(&View::loading(ViewKind::Simple));
        surface.set_visible(true);
        surface.set_visible(false);
        assert_eq!(surface.mounts.len(), 1);
        assert_eq!(surface.visibility_log, vec![true, false]);
        assert!(!surface.is_visible());
    }
}
