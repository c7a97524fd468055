//! PLAYTEST command line entrypoint.

mod cli;
mod commands;
mod db;
mod seed;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use services::{AppServices, Clock};

use crate::cli::{Cli, Command};

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Open + migrate SQLite here so the library crates stay free of path handling.
    let db_url = db::normalize_sqlite_url(&cli.db)?;
    db::prepare_sqlite_file(&db_url)?;
    let app = AppServices::new_sqlite(&db_url, Clock::system()).await?;
    tracing::info!(db = %db_url, user = %cli.user, "storage ready");

    match cli.command {
        Command::Seed { block } => commands::seed(&app, block).await,
        Command::Plan { block, count } => commands::plan(&app, cli.user, block, count).await,
        Command::Practice { block, count, mode } => {
            commands::practice(&app, cli.user, block, count, mode).await
        }
        Command::Reward {
            correct,
            total,
            mode,
            victory,
        } => commands::reward(&app, cli.user, correct, total, mode, victory).await,
        Command::Balance { limit } => commands::balance(&app, cli.user, limit).await,
    }
}
