use anyhow::Result;
use gallery::{items::distinct_types, prelude::*};

use crate::cli::{AppContext, ItemsArgs, ItemsCommands};
use crate::output::OutputFormat;

pub async fn handle(ctx: &AppContext, args: ItemsArgs) -> Result<()> {
    let items = ctx.source.load_items().await?;
    match args.command {
        ItemsCommands::List { view } => {
            let selected: Vec<Item> = prepare_items(&items, &view.to_options())
                .into_iter()
                .cloned()
                .collect();
            ctx.output.emit_rows(&selected)
        }
        ItemsCommands::Types => {
            let types = distinct_types(&items);
            if ctx.output.format() == OutputFormat::Table {
                return ctx.output.emit_text(&types.join("\n"));
            }
            ctx.output.emit_json(&types)
        }
    }
}
