use anyhow::Result;
use gallery::prelude::*;
use serde::Serialize;

use crate::cli::{AppContext, common::find_item};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct ThumbnailReport {
    id: String,
    /// which rule picked the thumbnail
    source: &'static str,
    /// url a browser tries first (empty for placeholders)
    initial: String,
    /// displayable url after fallbacks (`--online` only)
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved: Option<String>,
}

fn source_name(source: &ThumbnailSource) -> &'static str {
    match source {
        ThumbnailSource::AssetImage(_) => "asset_image",
        ThumbnailSource::Explicit(_) => "thumbnail",
        ThumbnailSource::YouTube { .. } => "youtube",
        ThumbnailSource::SoundCloud { .. } => "soundcloud",
        ThumbnailSource::Placeholder => "placeholder",
    }
}

pub async fn handle(ctx: &AppContext, id: &str, online: bool) -> Result<()> {
    let item = find_item(ctx, id).await?;
    let source = thumbnail_source(&item);
    let resolved = if online {
        Some(
            ctx.client
                .resolve_thumbnail(&item, PlaceholderSize::Grid)
                .await,
        )
    } else {
        None
    };
    let report = ThumbnailReport {
        id: item.id.clone(),
        source: source_name(&source),
        initial: resolve_thumbnail_url(&item),
        resolved,
    };
    if ctx.output.format() == OutputFormat::Table {
        let url = report.resolved.as_deref().unwrap_or(&report.initial);
        return ctx.output.emit_text(&format!("{}\t{url}", report.source));
    }
    ctx.output.emit_json(&report)
}
