//! common functions for cli
//!

use anyhow::Result;
use gallery::prelude::*;

use crate::cli::AppContext;

/// Items come from the site over http, or from a local project directory
#[derive(Debug, Clone)]
pub enum SiteSource {
    Site(GalleryClient),
    Dir(DirSource),
}

impl ItemSource for SiteSource {
    async fn load_items(&self) -> gallery::Result<Vec<Item>> {
        match self {
            Self::Site(client) => client.load_items().await,
            Self::Dir(dir) => dir.load_items().await,
        }
    }

    async fn load_text(&self, path: &str) -> gallery::Result<String> {
        match self {
            Self::Site(client) => client.load_text(path).await,
            Self::Dir(dir) => dir.load_text(path).await,
        }
    }

    async fn lookup_thumbnail(&self, track_url: &str) -> gallery::Result<Option<String>> {
        match self {
            Self::Site(client) => client.lookup_thumbnail(track_url).await,
            Self::Dir(dir) => dir.lookup_thumbnail(track_url).await,
        }
    }

    fn youtube_thumbnail_base(&self) -> &str {
        match self {
            Self::Site(client) => client.youtube_thumbnail_base(),
            Self::Dir(dir) => dir.youtube_thumbnail_base(),
        }
    }
}

/// Loads the item list and finds an item by id
pub(crate) async fn find_item(ctx: &AppContext, id: &str) -> Result<Item> {
    let items = ctx.source.load_items().await?;
    let item = items
        .into_iter()
        .find(|item| item.id == id)
        .ok_or_else(|| GalleryError::NotFound {
            obj_type: "Item".to_string(),
            key: id.to_string(),
        })?;
    Ok(item)
}
