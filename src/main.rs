mod analysis;
mod cli;
mod config;
mod error;
mod filter;
mod loader;
mod movement;
mod ranking;
mod report;
mod shell;
mod storage;
mod watchlist;

use anyhow::Context;
use clap::Parser;
use crossterm::tty::IsTty;
use std::io;

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::shell::Shell;
use crate::storage::Storage;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let storage = match &cli.storage {
        Some(dir) => Storage::new(dir),
        None => Storage::new_relative("storage")?,
    };
    let config = AppConfig::load(&storage)
        .context("loading config.json")?
        .with_overrides(&cli);
    tracing::debug!(?config, "resolved configuration");

    let export = cli.export.then_some(storage);
    let stdin = io::stdin();
    let stdout = io::stdout();

    if cli.once {
        let mut shell = Shell::new(stdin.lock(), stdout.lock(), config, export);
        return shell.analysis();
    }

    if stdout.is_tty() {
        if let Err(e) = clearscreen::clear() {
            tracing::warn!(error = %e, "could not clear screen");
        }
    }

    let mut shell = Shell::new(stdin.lock(), stdout.lock(), config, export);
    shell.show_credits()?;
    shell.run()
}
