//! Gallery HTTP client
//!
//! Reads a static gallery site and the third-party thumbnail endpoints.
//!
//! # Creating a client
//!
//! - [new](GalleryClient::new) - create client with default configuration
//! - [with_config](GalleryClient::with_config) - create client with custom configuration
//! - [with_client](GalleryClient::with_client) - create client with configuration and custom reqwest client
//!
//! # Reading
//!
//! - [fetch_items](GalleryClient::fetch_items) - load `data/items.json`
//! - [fetch_text](GalleryClient::fetch_text) - load a markdown asset
//! - [soundcloud_thumbnail](GalleryClient::soundcloud_thumbnail) - oEmbed thumbnail lookup
//! - [resolve_thumbnail](GalleryClient::resolve_thumbnail) - thumbnail with the fallback chain applied
//!

use std::{sync::Arc, time::Duration};

use tracing::debug;

use crate::{
    DEFAULT_ITEMS_PATH, DEFAULT_SITE_URL, Result,
    config::{GALLERY_URL_ENV, HTTP_TIMEOUT, SOUNDCLOUD_OEMBED_URL, YOUTUBE_THUMBNAIL_BASE},
    http_client::{HttpClient, HttpMetricsSnapshot},
    items::{Item, parse_items},
    oembed::{OEmbedResponse, PendingThumbnail, oembed_request_url},
    resolver::{
        FallbackStep, PlaceholderSize, ThumbnailSource, item_placeholder, thumbnail_source,
    },
    source::ItemSource,
    validation::ValidationLimits,
};

/// Configuration for the gallery client: site url, third-party endpoints, limits.
///
/// ```rust
/// use gallery::prelude::*;
/// let config = ClientConfig::default()
///     .base_url("http://localhost:8080/")
///     .items_path("data/items.json");
/// assert_eq!(config.base_url, "http://localhost:8080");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Site root. If not set, the environment variable `GALLERY_URL` is used,
    /// then `http://127.0.0.1:8080`.
    pub base_url: String,

    /// Item list path, relative to the site root
    pub items_path: String,

    /// YouTube thumbnail CDN, without trailing slash
    pub youtube_thumbnail_base: String,

    /// SoundCloud oEmbed endpoint
    pub soundcloud_oembed_url: String,

    /// Limits for sanity checking
    pub limits: ValidationLimits,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: std::env::var(GALLERY_URL_ENV)
                .unwrap_or_else(|_| DEFAULT_SITE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            items_path: DEFAULT_ITEMS_PATH.to_string(),
            youtube_thumbnail_base: YOUTUBE_THUMBNAIL_BASE.to_string(),
            soundcloud_oembed_url: SOUNDCLOUD_OEMBED_URL.to_string(),
            limits: ValidationLimits::default(),
            timeout: HTTP_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Sets the site root. A trailing slash is removed.
    pub fn base_url(self, base_url: &str) -> Self {
        ClientConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..self
        }
    }

    pub fn items_path(self, items_path: &str) -> Self {
        ClientConfig {
            items_path: items_path.to_string(),
            ..self
        }
    }

    pub fn youtube_thumbnail_base(self, base: &str) -> Self {
        ClientConfig {
            youtube_thumbnail_base: base.trim_end_matches('/').to_string(),
            ..self
        }
    }

    pub fn soundcloud_oembed_url(self, url: &str) -> Self {
        ClientConfig {
            soundcloud_oembed_url: url.to_string(),
            ..self
        }
    }

    pub fn limits(self, limits: ValidationLimits) -> Self {
        ClientConfig { limits, ..self }
    }

    pub fn timeout(self, timeout: Duration) -> Self {
        ClientConfig { timeout, ..self }
    }

    pub fn get_limits(&self) -> &ValidationLimits {
        &self.limits
    }
}

/// Client for a static gallery site.
#[derive(Debug, Clone)]
pub struct GalleryClient {
    pub(crate) client: Arc<HttpClient>,
    pub(crate) config: ClientConfig,
}

impl GalleryClient {
    /// Creates a new client with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with the provided configuration.
    ///
    /// # Example
    /// ```rust,no_run
    /// use gallery::prelude::*;
    /// # fn create_client() -> Result<GalleryClient, GalleryError> {
    /// let config = ClientConfig::default().base_url("http://localhost:8080");
    /// let client = GalleryClient::with_config(config)?;
    /// # Ok(client)
    /// # }
    /// ```
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let builder = reqwest::Client::builder()
            .no_proxy()
            .timeout(config.timeout);
        Self::with_client(builder, config)
    }

    /// Creates a client from a `reqwest::ClientBuilder` and configuration.
    pub fn with_client(builder: reqwest::ClientBuilder, config: ClientConfig) -> Result<Self> {
        debug!(url = ?config.base_url, "new client");
        let client = HttpClient::new(builder)?;
        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// Returns the configuration.
    pub fn get_config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute url for a site path. Absolute `http(s)` urls are returned unchanged.
    pub fn site_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!(
                "{}/{}",
                self.config.base_url,
                path.trim_start_matches("./").trim_start_matches('/')
            )
        }
    }

    /// Loads the item list.
    pub async fn fetch_items(&self) -> Result<Vec<Item>> {
        let url = self.site_url(&self.config.items_path);
        let body = self.client.get_bytes(&url).await?;
        let items = parse_items(&body, &url)?;
        debug!(count = items.len(), "items loaded");
        Ok(items)
    }

    /// Loads a text asset such as a markdown file.
    pub async fn fetch_text(&self, path: &str) -> Result<String> {
        let url = self.site_url(path);
        let text = self.client.get_text(&url).await?;
        self.config
            .limits
            .validate_markdown(&text, &format!("markdown {path}"))?;
        Ok(text)
    }

    /// Looks up a SoundCloud thumbnail. `Ok(None)` if the response had no thumbnail.
    pub async fn soundcloud_thumbnail(&self, track_url: &str) -> Result<Option<String>> {
        let url = oembed_request_url(&self.config.soundcloud_oembed_url, track_url);
        let resp: OEmbedResponse = self.client.get_json(&url).await?;
        Ok(resp.thumbnail().map(ToString::to_string))
    }

    /// Starts a background thumbnail lookup for a card.
    pub fn soundcloud_lookup(&self, card_id: &str, track_url: &str) -> PendingThumbnail {
        let client = self.clone();
        let track_url = track_url.to_string();
        PendingThumbnail::spawn(card_id, async move {
            client.soundcloud_thumbnail(&track_url).await
        })
    }

    /// Returns true if `url` answers a HEAD request with a 2xx status.
    pub async fn probe(&self, url: &str) -> Result<bool> {
        self.client.probe(url).await
    }

    /// Resolves a thumbnail eagerly, running the fallback chain that a browser
    /// runs on image errors. Returns the placeholder when nothing resolves.
    pub async fn resolve_thumbnail(&self, item: &Item, size: PlaceholderSize) -> String {
        let base = &self.config.youtube_thumbnail_base;
        let source = thumbnail_source(item);
        let mut src = source.initial_url(base);
        match &source {
            ThumbnailSource::YouTube { .. } => loop {
                if self.probe(&src).await.unwrap_or(false) {
                    return src;
                }
                match source.on_error(&src, base) {
                    FallbackStep::Retry(next) => src = next,
                    _ => break,
                }
            },
            ThumbnailSource::SoundCloud { url } => {
                match self.soundcloud_thumbnail(url).await {
                    Ok(Some(thumb)) => return thumb,
                    Ok(None) => debug!(id = %item.id, "no SoundCloud thumbnail"),
                    Err(err) => debug!(id = %item.id, error = %err, "SoundCloud thumbnail fetch failed"),
                }
            }
            ThumbnailSource::AssetImage(_) | ThumbnailSource::Explicit(_) => return src,
            ThumbnailSource::Placeholder => {}
        }
        item_placeholder(item, size)
    }

    /// Returns a snapshot of current HTTP metrics.
    pub fn http_metrics(&self) -> HttpMetricsSnapshot {
        self.client.metrics_snapshot()
    }
}

impl ItemSource for GalleryClient {
    async fn load_items(&self) -> Result<Vec<Item>> {
        self.fetch_items().await
    }

    async fn load_text(&self, path: &str) -> Result<String> {
        self.fetch_text(path).await
    }

    async fn lookup_thumbnail(&self, track_url: &str) -> Result<Option<String>> {
        self.soundcloud_thumbnail(track_url).await
    }

    fn youtube_thumbnail_base(&self) -> &str {
        &self.config.youtube_thumbnail_base
    }
}
