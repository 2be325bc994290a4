use anyhow::Result;
use gallery::prelude::*;
use serde::Serialize;

use crate::cli::{AppContext, PrefsArgs, PrefsCommands};
use crate::output::OutputFormat;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrefsReport {
    path: String,
    #[serde(flatten)]
    prefs: UiPreferences,
}

pub fn handle(ctx: &AppContext, args: PrefsArgs) -> Result<()> {
    let store = ctx.preferences();
    match args.command {
        PrefsCommands::Show => {}
        PrefsCommands::SetView { view } => UiPreferences::save_view(&store, view.to_kind())?,
        PrefsCommands::SetImageSize { size } => UiPreferences::save_image_size(&store, size)?,
    }
    let prefs = UiPreferences::load(&store);
    if ctx.output.format() == OutputFormat::Table {
        return ctx.output.emit_text(&format!(
            "currentView  {}\nimageSize    {}px\nfile         {}",
            prefs.current_view,
            prefs.image_size,
            store.path().display()
        ));
    }
    ctx.output.emit_json(&PrefsReport {
        path: store.path().display().to_string(),
        prefs,
    })
}
