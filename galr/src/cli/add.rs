use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use gallery::prelude::*;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::cli::{AddArgs, AppContext, ItemTypeArg};

/// Asks for the project root on stdin. An empty answer cancels.
struct PromptPicker;

impl DirectoryPicker for PromptPicker {
    async fn pick_directory(&self) -> gallery::Result<Option<PathBuf>> {
        let mut stderr = tokio::io::stderr();
        let _ = stderr.write_all(b"Project root directory: ").await;
        let _ = stderr.flush().await;
        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|source| GalleryError::Io {
                action: "read".to_string(),
                path: PathBuf::from("<stdin>"),
                source,
            })?;
        let answer = line.trim();
        Ok((!answer.is_empty()).then(|| PathBuf::from(answer)))
    }
}

fn fill_draft(draft: &mut ItemDraft, args: &AddArgs) {
    draft.id.clone_from(&args.id);
    draft.item_type = args.item_type.map(ItemTypeArg::to_item_type);
    draft.title = args.title.clone().unwrap_or_default();
    draft.summary = args.summary.clone().unwrap_or_default();
    if let Some(date) = &args.date {
        draft.date.clone_from(date);
    }
    for tag in &args.tags {
        draft.add_tag(tag);
    }
    if let Some(thumbnail) = &args.thumbnail {
        draft.set_thumbnail_path(thumbnail.clone());
    }
    draft.assets = AssetFields {
        image: args.image.clone(),
        video: args.video.clone(),
        audio: args.audio.clone(),
        content: args.content.clone(),
        markdown: None,
        repo: args.repo.clone(),
        demo: args.demo.clone(),
    };
}

pub async fn handle(ctx: &AppContext, args: AddArgs) -> Result<()> {
    let mut session = AdminSession::new();
    session.edit(|draft| fill_draft(draft, &args));

    if let Some(path) = &args.thumbnail_file {
        let upload = ThumbnailUpload::from_path(path).await?;
        session.edit(|draft| draft.set_thumbnail_file(upload));
    }
    if let Some(path) = &args.markdown_file {
        let body = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        session.edit(|draft| draft.assets.markdown = Some(body));
    }

    // validation errors keep their type for the exit code
    ValidationLimits::default().validate_item(&session.draft().to_item())?;

    let status = match &ctx.root {
        Some(root) => session.save(&FixedDirectory::new(root)).await,
        None => session.save(&PromptPicker).await,
    };
    match status {
        SaveStatus::Success { .. } => ctx.output.emit_json(&status),
        SaveStatus::Cancelled => Err(GalleryError::Cancelled.into()),
        SaveStatus::Error { message } => bail!("{message}"),
        SaveStatus::Idle | SaveStatus::Saving => bail!("save did not complete"),
    }
}
