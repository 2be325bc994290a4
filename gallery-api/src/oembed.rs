//! # SoundCloud thumbnail lookups
//!
//! SoundCloud thumbnails come from the oEmbed endpoint
//! (`{endpoint}?url={track}&format=json` → `thumbnail_url`). A lookup runs as
//! a spawned task owned by a [`PendingThumbnail`]; dropping the handle aborts
//! the task and the result is discarded. [`CardLookups`] holds the lookups for
//! the cards of one rendered view.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

use crate::Result;

/// oEmbed response. Only `thumbnail_url` is used.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct OEmbedResponse {
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OEmbedResponse {
    /// Thumbnail url, if present and non-empty
    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Lookup url for a track
pub fn oembed_request_url(endpoint: &str, track_url: &str) -> String {
    format!(
        "{endpoint}?url={}&format=json",
        urlencoding::encode(track_url)
    )
}

/// An in-flight thumbnail lookup for one card.
#[derive(Debug)]
pub struct PendingThumbnail {
    card_id: String,
    handle: JoinHandle<Option<String>>,
}

impl PendingThumbnail {
    /// Spawns `lookup` on the current tokio runtime. Lookup errors resolve to `None`.
    pub fn spawn<F>(card_id: impl Into<String>, lookup: F) -> Self
    where
        F: Future<Output = Result<Option<String>>> + Send + 'static,
    {
        let card_id = card_id.into();
        let id = card_id.clone();
        let handle = tokio::spawn(async move {
            match lookup.await {
                Ok(url) => url,
                Err(err) => {
                    debug!(card = %id, error = %err, "SoundCloud thumbnail fetch failed");
                    None
                }
            }
        });
        Self { card_id, handle }
    }

    pub fn card_id(&self) -> &str {
        &self.card_id
    }

    /// Handle that can observe or abort the task after this value is dropped
    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.abort_handle()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the lookup. `None` if it failed, found nothing, or was aborted.
    pub async fn resolve(mut self) -> Option<String> {
        (&mut self.handle).await.ok().flatten()
    }
}

impl Drop for PendingThumbnail {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Lookups for the cards of one view, keyed by card id.
#[derive(Debug, Default)]
pub struct CardLookups {
    pending: HashMap<String, PendingThumbnail>,
}

impl CardLookups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a lookup, aborting any previous lookup for the same card.
    pub fn insert(&mut self, pending: PendingThumbnail) {
        self.pending.insert(pending.card_id().to_string(), pending);
    }

    /// Aborts the lookup for a card (the card was removed).
    pub fn cancel(&mut self, card_id: &str) -> bool {
        self.pending.remove(card_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Waits for whichever lookup finishes first and removes it. Returns the
    /// card id and the thumbnail found, or `None` when no lookups remain.
    pub async fn next_finished(&mut self) -> Option<(String, Option<String>)> {
        if self.pending.is_empty() {
            return None;
        }
        let (ids, handles): (Vec<&String>, Vec<&mut JoinHandle<Option<String>>>) = self
            .pending
            .iter_mut()
            .map(|(id, pending)| (id, &mut pending.handle))
            .unzip();
        let (joined, index, _) = futures::future::select_all(handles).await;
        let id = ids[index].clone();
        self.pending.remove(&id);
        Some((id, joined.ok().flatten()))
    }

    /// Waits for every lookup. Returns `(card id, thumbnail url)` for each
    /// lookup that found a thumbnail.
    pub async fn resolve_all(self) -> Vec<(String, String)> {
        let lookups = self
            .pending
            .into_iter()
            .map(|(id, pending)| async move { pending.resolve().await.map(|url| (id, url)) });
        let mut resolved: Vec<_> = futures::future::join_all(lookups)
            .await
            .into_iter()
            .flatten()
            .collect();
        resolved.sort();
        resolved
    }
}
