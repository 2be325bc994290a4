use anyhow::{Context, Result};
use gallery::prelude::*;

use crate::cli::{AppContext, common::find_item};
use crate::output::OutputFormat;

pub async fn handle(ctx: &AppContext, id: &str) -> Result<()> {
    let item = find_item(ctx, id).await?;
    let mut panel = DetailPanel::new();
    if let Some(summary) = panel.hover(&item, &ctx.source) {
        summary.await?;
    }
    let content = panel.content().context("detail panel is hidden")?;

    if ctx.output.format() == OutputFormat::Table {
        let mut lines = vec![content.title.clone()];
        if !content.item_type.is_empty() {
            lines.push(content.item_type.clone());
        }
        if let Some(summary) = content.summary.text() {
            lines.push(summary.to_string());
        }
        if let Some(date) = &content.date {
            lines.push(date.clone());
        }
        if !content.tags.is_empty() {
            lines.push(content.tags.join(", "));
        }
        return ctx.output.emit_text(&lines.join("\n"));
    }
    ctx.output.emit_json(&content)
}
