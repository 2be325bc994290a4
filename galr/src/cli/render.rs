use anyhow::{Context, Result, bail};
use gallery::{
    prelude::*,
    render::{html_page, view_html},
};

use crate::cli::{AppContext, RenderArgs, ViewArg};

/// Renders one view through the app shell. Preferences are read from the
/// preferences file but not written back.
pub async fn handle(ctx: &AppContext, args: RenderArgs) -> Result<()> {
    let stored = UiPreferences::load(&ctx.preferences());
    let view = args.view.map_or(stored.current_view, ViewArg::to_kind);

    let prefs = MemoryPreferences::new();
    UiPreferences::save_view(&prefs, view)?;
    UiPreferences::save_image_size(&prefs, stored.image_size)?;

    let mut app = GalleryApp::new(ctx.source.clone(), Box::new(prefs), |_| {
        RecordingSurface::default()
    });
    let options = args.controls.to_options();
    match view {
        ViewKind::Grid => {
            app.set_grid_controls(options).await;
        }
        ViewKind::Table => {
            app.set_table_controls(options).await;
        }
        ViewKind::Simple => {}
    }
    app.start().await;

    let rendered = app
        .surface(view)
        .current()
        .context("nothing was rendered")?;
    if let ViewBody::Error { message } = &rendered.body {
        bail!("{message}");
    }

    if ctx.json_requested {
        return ctx.output.emit_json(rendered);
    }
    let html = if args.page {
        html_page(&args.title, rendered, app.image_size())
    } else {
        view_html(rendered)
    };
    ctx.output.emit_text(&html)
}
