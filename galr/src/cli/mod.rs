/*
 * galr - list, render, and add media gallery items
 *
 * SPDX-FileCopyrightText: 2025-2026 Steve Schoettler
 * SPDX-License-Identifier: Apache-2.0
 */
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use gallery::prelude::*;
use tracing::warn;

use crate::{
    cli::common::SiteSource,
    output::{Output, OutputFormat},
};

pub mod action;
pub mod add;
pub mod common;
pub mod detail;
pub mod items;
pub mod prefs;
pub mod render;
pub mod thumbnail;

#[derive(Parser, Debug)]
#[command(name = "galr")]
#[command(author, version, about = "galr: list, render, and add media gallery items", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Site URL. Default: environment `GALLERY_URL` or <http://127.0.0.1:8080>
    #[arg(short = 'u', long, env = "GALLERY_URL")]
    pub url: Option<String>,

    /// Local project directory. When set, items are read from disk instead of the site
    #[arg(short = 'r', long, env = "GALLERY_ROOT", global = true)]
    pub root: Option<PathBuf>,

    /// Preferences file (default: {config_dir}/gallery/preferences.json)
    #[arg(long, env = "GALLERY_PREFS", global = true)]
    pub prefs: Option<PathBuf>,

    /// Write output to file (default: stdout)
    #[arg(short = 'o', long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// JSON output (default)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Table output format
    #[arg(short, long, global = true)]
    pub table: bool,

    /// Quiet mode - suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (repeat for more: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Item list operations
    #[command(alias = "item")]
    Items(ItemsArgs),

    /// Render a view as html
    Render(RenderArgs),

    /// Resolve the thumbnail of an item
    Thumbnail {
        /// item id
        id: String,

        /// probe YouTube thumbnails and look up SoundCloud artwork
        #[arg(long)]
        online: bool,
    },

    /// Show where clicking an item navigates
    Action {
        /// item id
        id: String,
    },

    /// Show the hover detail panel content of an item
    Detail {
        /// item id
        id: String,
    },

    /// Add an item to a project directory
    Add(Box<AddArgs>),

    /// UI preferences
    #[command(alias = "pref")]
    Prefs(PrefsArgs),
}

#[derive(Args, Debug)]
pub struct ItemsArgs {
    #[command(subcommand)]
    pub command: ItemsCommands,
}

#[derive(Subcommand, Debug)]
pub enum ItemsCommands {
    List {
        #[command(flatten)]
        view: ViewArgs,
    },
    /// List the distinct item types
    Types,
}

/// Sort and filter controls
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// keep only items of this type
    #[arg(long = "type", value_name = "TYPE")]
    pub item_type: Option<String>,

    /// reverse file order (default: file order)
    #[arg(long)]
    pub desc: bool,
}

impl ViewArgs {
    pub fn to_options(&self) -> ViewOptions {
        let sort = if self.desc {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };
        ViewOptions::default()
            .sort(sort)
            .filter_type(self.item_type.clone().unwrap_or_default())
    }
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// view to render (default: stored current view)
    #[arg(long, value_enum)]
    pub view: Option<ViewArg>,

    #[command(flatten)]
    pub controls: ViewArgs,

    /// wrap the fragment in a standalone html page
    #[arg(long)]
    pub page: bool,

    /// page title (with --page)
    #[arg(long, default_value = "Gallery")]
    pub title: String,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// item id
    #[arg(long)]
    pub id: String,

    /// item type
    #[arg(long = "type", value_enum)]
    pub item_type: Option<ItemTypeArg>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub summary: Option<String>,

    /// date as YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,

    /// tag (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// thumbnail url or site path
    #[arg(long, conflicts_with = "thumbnail_file")]
    pub thumbnail: Option<String>,

    /// thumbnail image, copied to thumbnails/{id}.{ext}
    #[arg(long, value_name = "FILE")]
    pub thumbnail_file: Option<PathBuf>,

    /// picture: image path
    #[arg(long)]
    pub image: Option<String>,

    /// movie: video url
    #[arg(long)]
    pub video: Option<String>,

    /// music: audio url
    #[arg(long)]
    pub audio: Option<String>,

    /// write: markdown path, such as /content/article.md
    #[arg(long)]
    pub content: Option<String>,

    /// write: markdown body, saved into content/
    #[arg(long, value_name = "FILE")]
    pub markdown_file: Option<PathBuf>,

    /// dev: repository url
    #[arg(long)]
    pub repo: Option<String>,

    /// dev: demo url
    #[arg(long)]
    pub demo: Option<String>,
}

#[derive(Args, Debug)]
pub struct PrefsArgs {
    #[command(subcommand)]
    pub command: PrefsCommands,
}

#[derive(Subcommand, Debug)]
pub enum PrefsCommands {
    /// Show stored preferences
    Show,
    /// Set the current view
    SetView {
        #[arg(value_enum)]
        view: ViewArg,
    },
    /// Set the grid image size in pixels
    SetImageSize {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        size: u32,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ViewArg {
    Grid,
    Table,
    Simple,
}

impl ViewArg {
    pub fn to_kind(self) -> ViewKind {
        match self {
            Self::Grid => ViewKind::Grid,
            Self::Table => ViewKind::Table,
            Self::Simple => ViewKind::Simple,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ItemTypeArg {
    Picture,
    Movie,
    Music,
    Write,
    Dev,
    Software,
    Hardware,
}

impl ItemTypeArg {
    pub fn to_item_type(self) -> ItemType {
        match self {
            Self::Picture => ItemType::Picture,
            Self::Movie => ItemType::Movie,
            Self::Music => ItemType::Music,
            Self::Write => ItemType::Write,
            Self::Dev => ItemType::Dev,
            Self::Software => ItemType::Software,
            Self::Hardware => ItemType::Hardware,
        }
    }
}

pub struct AppContext {
    /// Where items are read from
    pub source: SiteSource,
    /// Site client, also used for thumbnail lookups when reading from disk
    pub client: GalleryClient,
    pub output: Output,
    /// `--json` or `--pretty` was given
    pub json_requested: bool,
    pub root: Option<PathBuf>,
    pub prefs_path: PathBuf,
}

impl AppContext {
    pub fn preferences(&self) -> FilePreferences {
        FilePreferences::open(&self.prefs_path)
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(resolve_output_format(&cli), cli.output.clone());
    let client = build_client(&cli)?;
    let source = cli.root.as_ref().map_or_else(
        || SiteSource::Site(client.clone()),
        |root| SiteSource::Dir(DirSource::new(root)),
    );

    let ctx = AppContext {
        source,
        client,
        output,
        json_requested: cli.json || cli.pretty,
        root: cli.root.clone(),
        prefs_path: cli
            .prefs
            .clone()
            .unwrap_or_else(FilePreferences::default_path),
    };

    match cli.command {
        Commands::Items(args) => items::handle(&ctx, args).await,
        Commands::Render(args) => render::handle(&ctx, args).await,
        Commands::Thumbnail { id, online } => thumbnail::handle(&ctx, &id, online).await,
        Commands::Action { id } => action::handle(&ctx, &id).await,
        Commands::Detail { id } => detail::handle(&ctx, &id).await,
        Commands::Add(args) => add::handle(&ctx, *args).await,
        Commands::Prefs(args) => prefs::handle(&ctx, args),
    }
}

fn resolve_output_format(cli: &Cli) -> OutputFormat {
    if cli.quiet {
        OutputFormat::Quiet
    } else if cli.pretty {
        if cli.table {
            warn!("--pretty conflicts with --table. Using json pretty format");
        }
        OutputFormat::Pretty
    } else if cli.json {
        if cli.table {
            warn!("--json conflicts with --table. Using json format");
        }
        OutputFormat::Json
    } else if cli.table {
        OutputFormat::Table
    } else {
        OutputFormat::Json
    }
}

fn build_client(cli: &Cli) -> Result<GalleryClient> {
    let mut config = ClientConfig::default();
    if let Some(url) = &cli.url {
        config = config.base_url(url);
    }
    Ok(GalleryClient::with_config(config)?)
}
