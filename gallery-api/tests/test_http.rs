//! HTTP tests against the in-crate mock site
//!
//! Covers item loading, error mapping, markdown fetches, YouTube thumbnail
//! probing and SoundCloud oEmbed lookups.
//!
//! ```bash
//! cargo test -p gallery --test test_http
//! ```

mod common;

use common::{mixed_items, mock_client, start_mock};
use gallery::mock::{MockResponse, MockSiteServer};
use gallery::prelude::*;

// =============================================================================
// Item list
// =============================================================================

#[test_log::test(tokio::test)]
async fn test_fetch_items() -> anyhow::Result<()> {
    let handle = start_mock(MockSiteServer::new().with_items(&mixed_items())).await;
    let client = mock_client(&handle);

    let items = client.fetch_items().await?;
    assert_eq!(items, mixed_items());
    assert_eq!(handle.hits("/data/items.json"), 1);

    let metrics = client.http_metrics();
    assert_eq!(metrics.total_requests, 1);
    assert_eq!(metrics.successful_responses, 1);
    assert_eq!(metrics.errors, 0);
    assert!(metrics.bytes_received > 0);

    handle.shutdown().await;
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_missing_items_is_api_error() {
    let handle = start_mock(MockSiteServer::new()).await;
    let client = mock_client(&handle);

    let err = client.fetch_items().await.unwrap_err();
    match &err {
        GalleryError::ApiError { code, url, .. } => {
            assert_eq!(*code, 404);
            assert!(url.ends_with("/data/items.json"), "{url}");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
    assert!(err.to_string().ends_with(": 404 Not Found"), "{err}");
    assert_eq!(client.http_metrics().errors, 1);
    handle.shutdown().await;
}

#[test_log::test(tokio::test)]
async fn test_non_array_items() {
    let server = MockSiteServer::new().route(
        "/data/items.json",
        MockResponse::json(r#"{"items": []}"#),
    );
    let handle = start_mock(server).await;
    let client = mock_client(&handle);

    let err = client.fetch_items().await.unwrap_err();
    assert!(matches!(err, GalleryError::NotAnArray { .. }), "{err:?}");
    handle.shutdown().await;
}

#[test_log::test(tokio::test)]
async fn test_bad_item_reports_path() {
    let server = MockSiteServer::new().route(
        "/data/items.json",
        MockResponse::json(r#"[{"id": "a"}, {"id": "b", "tags": "oops"}]"#),
    );
    let handle = start_mock(server).await;
    let client = mock_client(&handle);

    let err = client.fetch_items().await.unwrap_err();
    match err {
        GalleryError::Deserialization { path, .. } => assert!(path.starts_with("[1]"), "{path}"),
        other => panic!("expected Deserialization, got {other:?}"),
    }
    handle.shutdown().await;
}

#[test_log::test(tokio::test)]
async fn test_fetch_markdown() -> anyhow::Result<()> {
    let handle = start_mock(MockSiteServer::sample()).await;
    let client = mock_client(&handle);

    let text = client.fetch_text("/content/notes.md").await?;
    assert!(text.starts_with("# Notes"));
    assert!(client.fetch_text("/content/missing.md").await.is_err());
    handle.shutdown().await;
    Ok(())
}

// =============================================================================
// Rendering through the client
// =============================================================================

#[test_log::test(tokio::test)]
async fn test_render_error_is_inline() {
    let handle = start_mock(MockSiteServer::new()).await;
    let client = mock_client(&handle);
    let mut surface = RecordingSurface::default();

    let (view, items) = gallery::views::render_view(
        &mut surface,
        ViewKind::Table,
        &ViewOptions::default(),
        None,
        &client,
    )
    .await;

    assert!(items.is_none());
    assert_eq!(surface.mounts.len(), 2);
    assert_eq!(surface.mounts[0].body, ViewBody::Loading);
    match &view.body {
        ViewBody::Error { message } => assert!(message.contains("404"), "{message}"),
        other => panic!("expected inline error, got {other:?}"),
    }
    handle.shutdown().await;
}

// =============================================================================
// Thumbnails
// =============================================================================

#[test_log::test(tokio::test)]
async fn test_youtube_falls_back_to_hq() {
    let server = MockSiteServer::new()
        .route("/vi/abc123/maxresdefault.jpg", MockResponse::status(404))
        .route(
            "/vi/abc123/hqdefault.jpg",
            MockResponse::new(200, "image/jpeg", vec![0xff, 0xd8]),
        );
    let handle = start_mock(server).await;
    let client = mock_client(&handle);
    let item = Item::new("clip").with_url("https://www.youtube.com/watch?v=abc123");

    let resolved = client.resolve_thumbnail(&item, PlaceholderSize::Grid).await;
    assert_eq!(resolved, format!("{}/vi/abc123/hqdefault.jpg", handle.url()));
    assert_eq!(
        handle.requests(),
        vec![
            "HEAD /vi/abc123/maxresdefault.jpg".to_string(),
            "HEAD /vi/abc123/hqdefault.jpg".to_string(),
        ]
    );
    handle.shutdown().await;
}

#[test_log::test(tokio::test)]
async fn test_youtube_exhausted_gives_placeholder() {
    let handle = start_mock(MockSiteServer::new()).await;
    let client = mock_client(&handle);
    let item = Item::new("clip")
        .with_type(ItemType::Movie)
        .with_url("https://youtu.be/zzz");

    let resolved = client.resolve_thumbnail(&item, PlaceholderSize::Table).await;
    assert_eq!(resolved, gallery::resolver::item_placeholder(&item, PlaceholderSize::Table));
    assert_eq!(handle.hits("/vi/zzz/maxresdefault.jpg"), 1);
    assert_eq!(handle.hits("/vi/zzz/hqdefault.jpg"), 1);
    handle.shutdown().await;
}

#[test_log::test(tokio::test)]
async fn test_soundcloud_oembed() -> anyhow::Result<()> {
    let server = MockSiteServer::new().route(
        "/oembed",
        MockResponse::json(r#"{"version": 1, "thumbnail_url": "https://i1.sndcdn.com/art.jpg"}"#),
    );
    let handle = start_mock(server).await;
    let client = mock_client(&handle);
    let track = "https://soundcloud.com/artist/track";

    let thumb = client.soundcloud_thumbnail(track).await?;
    assert_eq!(thumb.as_deref(), Some("https://i1.sndcdn.com/art.jpg"));
    let requests = handle.requests();
    assert_eq!(
        requests[0],
        "GET /oembed?url=https%3A%2F%2Fsoundcloud.com%2Fartist%2Ftrack&format=json"
    );

    let pending = client.soundcloud_lookup("card-1", track);
    assert_eq!(pending.card_id(), "card-1");
    assert_eq!(
        pending.resolve().await.as_deref(),
        Some("https://i1.sndcdn.com/art.jpg")
    );

    let item = Item::new("song").with_url(track);
    let resolved = client.resolve_thumbnail(&item, PlaceholderSize::Grid).await;
    assert_eq!(resolved, "https://i1.sndcdn.com/art.jpg");
    handle.shutdown().await;
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_soundcloud_failure_gives_placeholder() {
    let server = MockSiteServer::new().route("/oembed", MockResponse::status(500));
    let handle = start_mock(server).await;
    let client = mock_client(&handle);
    let item = Item::new("song")
        .with_type(ItemType::Music)
        .with_url("https://soundcloud.com/a/b");

    assert!(client.soundcloud_lookup("song", "https://soundcloud.com/a/b").resolve().await.is_none());
    let resolved = client.resolve_thumbnail(&item, PlaceholderSize::Grid).await;
    assert!(resolved.starts_with("data:image/svg+xml,"), "{resolved}");
    handle.shutdown().await;
}

#[test_log::test(tokio::test)]
async fn test_slow_lookup_is_dropped_with_card() {
    let server = MockSiteServer::new().route(
        "/oembed",
        MockResponse::json(r#"{"thumbnail_url": "late.jpg"}"#)
            .delayed(std::time::Duration::from_secs(30)),
    );
    let handle = start_mock(server).await;
    let client = mock_client(&handle);

    let pending = client.soundcloud_lookup("card", "https://soundcloud.com/a/b");
    let abort = pending.abort_handle();
    drop(pending);
    for _ in 0..100 {
        if abort.is_finished() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(abort.is_finished());
    handle.shutdown().await;
}
