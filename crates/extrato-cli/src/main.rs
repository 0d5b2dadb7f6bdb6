//! Extrato CLI - Bank statement parser
//!
//! Usage:
//!   extrato parse --file extrato.csv [--file ...] [--json]
//!   extrato institutions [--name nubank]
//!   extrato identify --file extrato.pdf

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let importer = commands::build_importer(cli.config.as_deref())?;

    match cli.command {
        Commands::Parse { file, json } => commands::cmd_parse(&importer, &file, json).await,
        Commands::Institutions { name } => {
            commands::cmd_institutions(&importer, name.as_deref())
        }
        Commands::Identify { file } => commands::cmd_identify(&importer, &file),
    }
}
