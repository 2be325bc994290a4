use anyhow::{Result, anyhow};
use gallery::prelude::*;
use serde::Serialize;

use crate::cli::{AppContext, common::find_item};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct ActionReport<'a> {
    id: &'a str,
    href: String,
    target: &'static str,
    #[serde(flatten)]
    action: &'a ClickAction,
}

pub async fn handle(ctx: &AppContext, id: &str) -> Result<()> {
    let item = find_item(ctx, id).await?;
    let action = resolve_action(&item).ok_or_else(|| anyhow!("item {id} has no click action"))?;
    if ctx.output.format() == OutputFormat::Table {
        return ctx.output.emit_rows(&[action]);
    }
    ctx.output.emit_json(&ActionReport {
        id,
        href: action.href(),
        target: action.target(),
        action: &action,
    })
}
