/*
 * galr - list, render, and add media gallery items
 *
 * SPDX-FileCopyrightText: 2025-2026 Steve Schoettler
 * SPDX-License-Identifier: Apache-2.0
 */
#![warn(clippy::pedantic)] // experimental
#![warn(clippy::nursery)] // experimental
#![allow(clippy::missing_errors_doc)] // pedantic
#![allow(clippy::missing_const_for_fn)] //  nursery function
#![allow(clippy::must_use_candidate)] // pedantic
#![warn(clippy::default_trait_access)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::implicit_clone)]
#![warn(clippy::match_same_arms)]
#![warn(clippy::option_if_let_else)]
#![warn(clippy::redundant_clone)]
#![warn(clippy::redundant_closure)]
#![warn(clippy::uninlined_format_args)]
#![warn(clippy::unused_async)]

mod cli;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = cli::run(cli).await {
        let code = error::exit_code(&err);
        if code == error::EXIT_CANCELLED {
            eprintln!("{err}");
        } else {
            eprintln!("galr: {err:#}");
        }
        std::process::exit(code);
    }
}

/// Log directives for `-v` counts. Only the gallery crates get louder;
/// http and runtime crates stay at warn until `-vvv`.
fn verbosity_directives(verbose: u8) -> String {
    let level = match verbose {
        0 => return "warn".to_string(),
        1 => "info",
        2 => "debug",
        _ => return "trace".to_string(),
    };
    format!("warn,galr={level},gallery={level}")
}

// RUST_LOG wins over -v. Logs go to stderr so stdout stays parseable.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_directives(verbose)));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .init();
}
