//! App shell tests: view switching, cached re-renders, preferences, inline
//! errors and SoundCloud thumbnail swaps.

mod common;

use std::time::Duration;

use common::{MemorySource, article, mixed_items, mock_client, start_mock};
use gallery::mock::{MockResponse, MockSiteServer};
use gallery::prelude::*;

type App = GalleryApp<MemorySource, RecordingSurface>;

fn app_with(source: MemorySource, prefs: Box<dyn PreferenceStore>) -> App {
    GalleryApp::new(source, prefs, |_| RecordingSurface::default())
}

fn card_ids(view: &View) -> Vec<&str> {
    view.ids()
}

const TRACK: &str = "https://soundcloud.com/artist/track";

fn song() -> Item {
    Item::new("song").with_type(ItemType::Music).with_url(TRACK)
}

fn thumbnail_of<'a>(view: &'a View, id: &str) -> &'a ThumbnailImage {
    let thumb = match &view.body {
        ViewBody::Grid(cards) => cards.iter().find(|c| c.id == id).map(|c| &c.thumbnail),
        ViewBody::Table(rows) => rows.iter().find(|r| r.id == id).map(|r| &r.thumbnail),
        _ => None,
    };
    thumb.expect("unit with thumbnail")
}

#[test_log::test(tokio::test)]
async fn test_start_renders_stored_view() -> anyhow::Result<()> {
    let prefs = MemoryPreferences::new();
    prefs.set("currentView", "table")?;
    prefs.set("imageSize", "320")?;
    let source = MemorySource::new(mixed_items());
    let mut app = app_with(source.clone(), Box::new(prefs));

    assert_eq!(app.current_view(), ViewKind::Table);
    assert_eq!(app.image_size(), 320);
    let plan = app.start().await;

    assert_eq!(plan.from, None);
    assert_eq!(plan.to, ViewKind::Table);
    assert_eq!(plan.exit, None);
    assert_eq!(plan.stagger.len(), 5);
    assert_eq!(plan.cleanup.as_millis(), 250 + 5 * 30 + 450);
    assert_eq!(app.visible_view(), Some(ViewKind::Table));
    assert!(app.surface(ViewKind::Table).is_visible());
    assert!(!app.surface(ViewKind::Grid).is_visible());
    assert_eq!(
        app.header(),
        HeaderControls {
            grid_visible: false,
            table_visible: true
        }
    );
    assert_eq!(app.cached_items().len(), 5);
    assert_eq!(source.item_loads(), 1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_controls_rerender_without_refetch() {
    let source = MemorySource::new(mixed_items());
    let mut app = app_with(source.clone(), Box::new(MemoryPreferences::new()));
    app.start().await;
    assert_eq!(source.item_loads(), 1);

    let view = app
        .set_grid_controls(ViewOptions::default().filter_type("movie"))
        .await
        .expect("grid is current");
    assert_eq!(card_ids(&view), vec!["m1", "m2"]);

    let view = app
        .set_grid_controls(
            ViewOptions::default()
                .filter_type("movie")
                .sort(SortOrder::Desc),
        )
        .await
        .expect("grid is current");
    assert_eq!(card_ids(&view), vec!["m2", "m1"]);
    assert_eq!(source.item_loads(), 1, "control change refetched items");

    let grid = app.surface(ViewKind::Grid);
    assert_eq!(grid.current().map(card_ids), Some(vec!["m2", "m1"]));

    // table controls are stored but do not render while the grid is current
    let none = app
        .set_table_controls(ViewOptions::default().sort(SortOrder::Desc))
        .await;
    assert!(none.is_none());
    assert!(app.surface(ViewKind::Table).mounts.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_switch_view_persists_and_hides_previous() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("preferences.json");
    let source = MemorySource::new(mixed_items());
    let mut app = app_with(source.clone(), Box::new(FilePreferences::open(&path)));
    app.start().await;

    let plan = app.switch_view(ViewKind::Simple).await;
    assert_eq!(plan.from, Some(ViewKind::Grid));
    assert_eq!(plan.exit, Some(ShellTiming::default().exit_animation));
    assert!(!app.surface(ViewKind::Grid).is_visible());
    assert!(app.surface(ViewKind::Simple).is_visible());
    assert_eq!(app.header(), HeaderControls::default());
    assert_eq!(source.item_loads(), 2);

    let reopened = FilePreferences::open(&path);
    assert_eq!(reopened.get("currentView").as_deref(), Some("simple"));

    app.set_image_size(240);
    assert_eq!(
        app.image_style(),
        "--image-size: 240px; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr));"
    );
    let reopened = FilePreferences::open(&path);
    assert_eq!(UiPreferences::load(&reopened).image_size, 240);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_type_filter_keeps_selection() {
    let source = MemorySource::new(mixed_items());
    let mut app = app_with(source, Box::new(MemoryPreferences::new()));
    app.set_grid_controls(ViewOptions::default().filter_type("movie"))
        .await;
    app.start().await;

    let options = app.type_options().expect("type options");
    assert_eq!(options.selected, "movie");
    let values: Vec<&str> = options.options.iter().map(|o| o.value.as_str()).collect();
    assert_eq!(values[0], "");
    assert!(values.contains(&"movie"));
    assert_eq!(app.grid_controls().filter_type, "movie");
}

#[test_log::test(tokio::test)]
async fn test_load_error_is_inline_and_visible() {
    let source = MemorySource::failing("connection refused");
    let mut app = app_with(source, Box::new(MemoryPreferences::new()));
    app.start().await;

    let grid = app.surface(ViewKind::Grid);
    assert!(grid.is_visible());
    match grid.current().map(|v| &v.body) {
        Some(ViewBody::Error { message }) => assert_eq!(message, "connection refused"),
        other => panic!("expected inline error, got {other:?}"),
    }
    assert!(app.cached_items().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_empty_list_renders_empty_state() {
    for kind in [ViewKind::Grid, ViewKind::Table, ViewKind::Simple] {
        let mut app = app_with(MemorySource::new(vec![]), Box::new(MemoryPreferences::new()));
        app.switch_view(kind).await;
        let current = app.surface(kind).current().expect("mounted");
        assert_eq!(current.body, ViewBody::Empty, "{kind}");
    }
}

#[test_log::test(tokio::test)]
async fn test_table_rows_get_markdown_tooltips() {
    let source = MemorySource::new(vec![article("a"), Item::new("b")]).with_text(
        "/content/a.md",
        "tooltip text",
        std::time::Duration::ZERO,
    );
    let mut app = app_with(source, Box::new(MemoryPreferences::new()));
    app.switch_view(ViewKind::Table).await;

    let table = app.surface(ViewKind::Table).current().expect("mounted");
    let ViewBody::Table(rows) = &table.body else {
        panic!("expected table, got {:?}", table.body);
    };
    assert_eq!(rows[0].tooltip.as_deref(), Some("tooltip text"));
    assert_eq!(rows[1].tooltip, None);
}

// =============================================================================
// SoundCloud thumbnails
// =============================================================================

#[test_log::test(tokio::test)]
async fn test_soundcloud_placeholder_swapped_in_place() {
    let items = vec![song(), Item::new("p1").with_type(ItemType::Picture)];
    let server = MockSiteServer::new().with_items(&items).route(
        "/oembed",
        MockResponse::json(r#"{"thumbnail_url": "https://i1.sndcdn.com/art.jpg"}"#),
    );
    let handle = start_mock(server).await;
    let client = mock_client(&handle);
    let mut app = GalleryApp::new(client, Box::new(MemoryPreferences::new()), |_| {
        RecordingSurface::default()
    });

    app.start().await;

    let grid = app.surface(ViewKind::Grid);
    assert_eq!(grid.mounts.len(), 3, "loading, placeholder, swapped");
    assert!(thumbnail_of(&grid.mounts[1], "song").is_placeholder());
    let current = grid.current().expect("mounted");
    assert_eq!(
        thumbnail_of(current, "song").src,
        "https://i1.sndcdn.com/art.jpg"
    );
    assert!(thumbnail_of(current, "p1").is_placeholder());
    assert_eq!(handle.hits("/oembed"), 1);
    assert_eq!(app.pending_lookups(), 0);
    handle.shutdown().await;
}

#[test_log::test(tokio::test)]
async fn test_failed_lookup_keeps_placeholder() {
    let server = MockSiteServer::new()
        .with_items(&[song()])
        .route("/oembed", MockResponse::status(500));
    let handle = start_mock(server).await;
    let client = mock_client(&handle);
    let mut app = GalleryApp::new(client, Box::new(MemoryPreferences::new()), |_| {
        RecordingSurface::default()
    });

    app.start().await;

    let grid = app.surface(ViewKind::Grid);
    assert_eq!(grid.mounts.len(), 2, "no remount without a thumbnail");
    let current = grid.current().expect("mounted");
    assert!(thumbnail_of(current, "song").is_placeholder());
    assert_eq!(handle.hits("/oembed"), 1);
    handle.shutdown().await;
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_rerender_aborts_previous_lookups() {
    let source = MemorySource::new(vec![song()]).with_thumbnail(
        TRACK,
        "https://i1.sndcdn.com/late.jpg",
        Duration::from_millis(500),
    );
    let mut app = app_with(source.clone(), Box::new(MemoryPreferences::new()));

    let interrupted = tokio::time::timeout(Duration::from_millis(100), app.start()).await;
    assert!(interrupted.is_err(), "start waits for the lookup");
    assert_eq!(app.pending_lookups(), 1);
    assert_eq!(source.lookups_started(), 1);

    let view = app
        .set_grid_controls(ViewOptions::default())
        .await
        .expect("grid is current");
    assert_eq!(thumbnail_of(&view, "song").src, "https://i1.sndcdn.com/late.jpg");

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(source.lookups_started(), 2);
    assert_eq!(source.lookups_finished(), 1, "first lookup was aborted");
    let current = app.surface(ViewKind::Grid).current().expect("mounted");
    assert_eq!(
        thumbnail_of(current, "song").src,
        "https://i1.sndcdn.com/late.jpg"
    );
}

#[test_log::test(tokio::test)]
async fn test_views_use_source_youtube_base() {
    let server = MockSiteServer::new()
        .with_items(&[Item::new("clip").with_url("https://youtu.be/abc123")]);
    let handle = start_mock(server).await;
    let client = mock_client(&handle);
    let mut app = GalleryApp::new(client, Box::new(MemoryPreferences::new()), |_| {
        RecordingSurface::default()
    });

    app.start().await;

    let current = app.surface(ViewKind::Grid).current().expect("mounted");
    let thumb = thumbnail_of(current, "clip");
    assert_eq!(thumb.src, format!("{}/vi/abc123/maxresdefault.jpg", handle.url()));
    assert_eq!(
        thumb.fallback.as_deref(),
        Some(format!("{}/vi/abc123/hqdefault.jpg", handle.url()).as_str())
    );
    handle.shutdown().await;
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_table_rows_swap_thumbnails() {
    let source = MemorySource::new(vec![song(), Item::new("plain")]).with_thumbnail(
        TRACK,
        "https://i1.sndcdn.com/row.jpg",
        Duration::from_millis(20),
    );
    let mut app = app_with(source, Box::new(MemoryPreferences::new()));

    app.switch_view(ViewKind::Table).await;

    let current = app.surface(ViewKind::Table).current().expect("mounted");
    assert_eq!(thumbnail_of(current, "song").src, "https://i1.sndcdn.com/row.jpg");
    assert!(thumbnail_of(current, "plain").is_placeholder());
    assert_eq!(app.pending_lookups(), 0);
}
